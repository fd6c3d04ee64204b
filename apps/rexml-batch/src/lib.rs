//! Batch normalization of reXML lease files
//!
//! Reads every `*.xml` file from the configured source folder, applies the
//! [`normalize_engine`] rules and writes `<name>_PROC.xml` into the target
//! folder. Per-file diagnostics land in `LogFiles/<name>.txt` under the base
//! directory.

pub mod config;
pub mod error;
pub mod file_log;
pub mod io;
pub mod runner;

pub use config::{BatchSettings, Config};
pub use error::BatchError;
pub use file_log::FileLog;
pub use runner::{BatchRunner, BatchSummary};
