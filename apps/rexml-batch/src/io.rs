//! Loading inputs and writing `_PROC` outputs

use std::fs;
use std::path::{Path, PathBuf};

use rexml_dom::Document;

use crate::error::BatchError;

/// Appended to the input stem to name the output file
pub const OUTPUT_SUFFIX: &str = "_PROC.xml";

const INPUT_EXTENSION: &str = ".xml";

/// Input file name without its `.xml` extension (matched case-insensitively)
pub fn input_stem(file_name: &str) -> &str {
    let split = file_name.len().saturating_sub(INPUT_EXTENSION.len());
    match (file_name.get(..split), file_name.get(split..)) {
        (Some(stem), Some(ext)) if ext.eq_ignore_ascii_case(INPUT_EXTENSION) => stem,
        _ => file_name,
    }
}

pub fn output_file_name(input_name: &str) -> String {
    format!("{}{}", input_stem(input_name), OUTPUT_SUFFIX)
}

pub fn is_input_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

/// `*.xml` files directly inside `dir`, sorted by file name
pub fn list_input_files(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if is_input_file(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Parse an input file into a fresh document
pub fn load_input(path: &Path) -> Result<Document, BatchError> {
    Document::load(path).map_err(BatchError::Parse)
}

/// Save `doc` as `<target_dir>/<stem>_PROC.xml`, creating the directory and
/// replacing any previous output
pub fn write_output(doc: &Document, target_dir: &Path, input_name: &str) -> Result<PathBuf, BatchError> {
    let write_err = |source| BatchError::Write {
        dir: target_dir.to_path_buf(),
        source,
    };

    fs::create_dir_all(target_dir).map_err(|e| write_err(e.into()))?;
    let path = target_dir.join(output_file_name(input_name));
    if path.exists() {
        fs::remove_file(&path).map_err(|e| write_err(e.into()))?;
    }
    doc.save(&path).map_err(write_err)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_input_stem() {
        assert_eq!(input_stem("Property1.xml"), "Property1");
        assert_eq!(input_stem("Upper.XML"), "Upper");
        assert_eq!(input_stem("notes.txt"), "notes.txt");
        assert_eq!(input_stem(".xml"), "");
        assert_eq!(input_stem("x"), "x");
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("Property1.xml"), "Property1_PROC.xml");
        assert_eq!(output_file_name("a.b.xml"), "a.b_PROC.xml");
    }

    #[test]
    fn test_list_input_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.xml"), "<reXML/>").unwrap();
        fs::write(dir.path().join("a.xml"), "<reXML/>").unwrap();
        fs::write(dir.path().join("readme.txt"), "").unwrap();
        fs::create_dir(dir.path().join("Templates.xml")).unwrap();

        let names: Vec<_> = list_input_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.xml", "b.xml"]);
    }

    #[test]
    fn test_write_output_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let doc = Document::parse("<reXML><A/></reXML>").unwrap();

        let first = write_output(&doc, &target, "p.xml").unwrap();
        fs::write(&first, "stale").unwrap();
        let second = write_output(&doc, &target, "p.xml").unwrap();

        assert_eq!(first, second);
        assert_eq!(second, target.join("p_PROC.xml"));
        let written = fs::read_to_string(&second).unwrap();
        assert!(written.contains("<A"));
        assert!(!written.contains("stale"));
    }

    #[test]
    fn test_load_input_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xml");
        fs::write(&path, "<reXML><Open></reXML>").unwrap();
        assert!(matches!(load_input(&path), Err(BatchError::Parse(_))));
    }
}
