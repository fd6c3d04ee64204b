//! Batch configuration
//!
//! Settings are read from a TOML file whose keys use the option names the
//! tool has always recognized (`SourceFolder`, `TargetFolder`, ...), then
//! command-line overrides are applied and relative paths are resolved
//! against the base directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use normalize_engine::TemplateFileNames;
use serde::{Deserialize, Serialize};

use crate::error::BatchError;

/// Fixed name of the per-file diagnostic log directory under the base directory
pub const LOG_DIR: &str = "LogFiles";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Folder holding the `*.xml` inputs and the `Templates` folder
    #[serde(rename = "SourceFolder", default)]
    pub source_folder: Option<PathBuf>,
    /// Folder receiving `<name>_PROC.xml` outputs; created when absent
    #[serde(rename = "TargetFolder", default)]
    pub target_folder: Option<PathBuf>,
    #[serde(rename = "AllPossibleAccountsFileName", default = "default_all_possible_accounts")]
    pub all_possible_accounts_file_name: String,
    #[serde(rename = "MLAEntriesFileName", default = "default_mla_entries")]
    pub mla_entries_file_name: String,
    #[serde(rename = "MLAUpdatesFileName", default = "default_mla_updates")]
    pub mla_updates_file_name: String,
    /// Directory relative paths and `LogFiles` are resolved against
    #[serde(rename = "BaseDirectory", default)]
    pub base_directory: Option<PathBuf>,
}

fn default_all_possible_accounts() -> String {
    TemplateFileNames::default().all_possible_accounts
}

fn default_mla_entries() -> String {
    TemplateFileNames::default().mla_entries
}

fn default_mla_updates() -> String {
    TemplateFileNames::default().mla_updates
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_folder: None,
            target_folder: None,
            all_possible_accounts_file_name: default_all_possible_accounts(),
            mla_entries_file_name: default_mla_entries(),
            mla_updates_file_name: default_mla_updates(),
            base_directory: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    pub fn template_file_names(&self) -> TemplateFileNames {
        TemplateFileNames {
            all_possible_accounts: self.all_possible_accounts_file_name.clone(),
            mla_entries: self.mla_entries_file_name.clone(),
            mla_updates: self.mla_updates_file_name.clone(),
        }
    }

    /// Resolve into concrete directories. `fallback_base` is used when no
    /// `BaseDirectory` is configured.
    pub fn resolve(&self, fallback_base: &Path) -> Result<BatchSettings, BatchError> {
        let base = match &self.base_directory {
            Some(dir) => fallback_base.join(dir),
            None => fallback_base.to_path_buf(),
        };
        let source = self
            .source_folder
            .as_ref()
            .ok_or(BatchError::MissingOption("SourceFolder"))?;
        let target = self
            .target_folder
            .as_ref()
            .ok_or(BatchError::MissingOption("TargetFolder"))?;

        Ok(BatchSettings {
            source_dir: base.join(source),
            target_dir: base.join(target),
            log_dir: base.join(LOG_DIR),
            template_names: self.template_file_names(),
        })
    }
}

/// Directory holding the running executable, the default base directory
pub fn program_base_dir() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    match exe.parent() {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir(),
    }
}

/// Fully resolved directories for one batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub log_dir: PathBuf,
    pub template_names: TemplateFileNames,
}
