//! Static template documents consulted by the property-data and MLA rules
//!
//! Templates are read through [`TemplateProvider`] so the rules never touch
//! the filesystem directly. [`DirectoryTemplates`] reads them from the
//! `Templates` folder next to the input files; [`InMemoryTemplates`] serves
//! fixed strings.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use rexml_dom::{Document, XmlError};
use thiserror::Error;

/// Name of the folder under the source folder that holds the templates
pub const TEMPLATES_DIR: &str = "Templates";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Every budget account a property may carry
    AllPossibleAccounts,
    /// Market leasing assumptions merged into every property
    MlaEntries,
    /// Per-property market rent overrides keyed by property reference
    MlaUpdates,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TemplateKind::AllPossibleAccounts => "all possible accounts",
            TemplateKind::MlaEntries => "MLA entries",
            TemplateKind::MlaUpdates => "MLA updates",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Source directory (\"{}\") not found.", .0.display())]
    DirectoryMissing(PathBuf),

    #[error("Source file (\"{}\") not found.", .0.display())]
    FileMissing(PathBuf),

    #[error("No {0} template configured.")]
    NotConfigured(TemplateKind),

    #[error("Template \"{path}\" could not be parsed: {source}")]
    Malformed {
        path: String,
        #[source]
        source: XmlError,
    },
}

impl TemplateError {
    /// Whether the template exists but could not be read as XML
    pub fn is_malformed(&self) -> bool {
        matches!(self, TemplateError::Malformed { .. })
    }
}

pub trait TemplateProvider {
    /// Load a fresh copy of the template; callers may not assume caching
    fn load(&self, kind: TemplateKind) -> Result<Document, TemplateError>;
}

/// File names of the three templates inside the templates directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFileNames {
    pub all_possible_accounts: String,
    pub mla_entries: String,
    pub mla_updates: String,
}

impl Default for TemplateFileNames {
    fn default() -> Self {
        Self {
            all_possible_accounts: "AllPossibleAccounts.xml".to_string(),
            mla_entries: "MLAEntries.xml".to_string(),
            mla_updates: "MLAUpdates.xml".to_string(),
        }
    }
}

impl TemplateFileNames {
    pub fn file_name(&self, kind: TemplateKind) -> &str {
        match kind {
            TemplateKind::AllPossibleAccounts => &self.all_possible_accounts,
            TemplateKind::MlaEntries => &self.mla_entries,
            TemplateKind::MlaUpdates => &self.mla_updates,
        }
    }
}

/// Reads templates from a directory, re-parsing the file on every load
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    dir: PathBuf,
    names: TemplateFileNames,
}

impl DirectoryTemplates {
    pub fn new(dir: impl Into<PathBuf>, names: TemplateFileNames) -> Self {
        Self {
            dir: dir.into(),
            names,
        }
    }

    /// Templates stored under `<source_folder>/Templates`
    pub fn under_source_folder(source_folder: &Path, names: TemplateFileNames) -> Self {
        Self::new(source_folder.join(TEMPLATES_DIR), names)
    }

    pub fn path_of(&self, kind: TemplateKind) -> PathBuf {
        self.dir.join(self.names.file_name(kind))
    }
}

impl TemplateProvider for DirectoryTemplates {
    fn load(&self, kind: TemplateKind) -> Result<Document, TemplateError> {
        if !self.dir.is_dir() {
            return Err(TemplateError::DirectoryMissing(self.dir.clone()));
        }
        let path = self.path_of(kind);
        if !path.is_file() {
            return Err(TemplateError::FileMissing(path));
        }
        Document::load(&path).map_err(|source| TemplateError::Malformed {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Templates held as XML strings
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplates {
    sources: HashMap<TemplateKind, String>,
}

impl InMemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: TemplateKind, xml: impl Into<String>) -> Self {
        self.sources.insert(kind, xml.into());
        self
    }
}

impl TemplateProvider for InMemoryTemplates {
    fn load(&self, kind: TemplateKind) -> Result<Document, TemplateError> {
        let xml = self
            .sources
            .get(&kind)
            .ok_or(TemplateError::NotConfigured(kind))?;
        Document::parse(xml).map_err(|source| TemplateError::Malformed {
            path: kind.to_string(),
            source,
        })
    }
}
