use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Failed to read XML file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed XML at byte {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Document has no root element")]
    MissingRoot,

    #[error("Element <{0}> is never closed")]
    Unclosed(String),

    #[error("Failed to serialize XML: {0}")]
    Write(String),
}
