//! Error types for the batch runner

use std::path::PathBuf;

use rexml_dom::XmlError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Missing required configuration option: {0}")]
    MissingOption(&'static str),

    #[error("Error in parsing xml file. Error: {0}")]
    Parse(#[source] XmlError),

    #[error("Error while saving file to \"{}\" folder. Error: {source}", .dir.display())]
    Write {
        dir: PathBuf,
        #[source]
        source: XmlError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
