//! Per-input diagnostic log files
//!
//! Each input `<stem>.xml` gets `LogFiles/<stem>.txt` under the base
//! directory. Entries are appended, separated by blank lines, and never
//! truncated between runs.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::io::input_stem;

#[derive(Debug, Clone)]
pub struct FileLog {
    path: Option<PathBuf>,
}

impl FileLog {
    /// Log for the input file named `file_name`; disabled when the name is empty
    pub fn for_input(log_dir: &Path, file_name: &str) -> Self {
        let stem = input_stem(file_name);
        if stem.is_empty() {
            return Self::disabled();
        }
        Self {
            path: Some(log_dir.join(format!("{stem}.txt"))),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one entry. Failures are reported on the console and never abort the run.
    pub fn append(&self, message: &str) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = Self::write_entry(path, message) {
            warn!("Could not write log file {}: {}", path.display(), e);
        }
    }

    fn write_entry(path: &Path, message: &str) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        write!(file, "\n\n\n{message}\n")
    }
}
