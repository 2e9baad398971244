use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::instrument;

use crate::domain::{Document, EvidenceStore};

/// Errors that can occur when reading the inputs of a validation run.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file does not exist.
    #[error("{} not found", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The evidence store is not valid JSON of the expected shape.
    #[error("failed to parse evidence store {}", path.display())]
    Json {
        /// The file being parsed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Reads the document at `path`.
///
/// # Errors
///
/// Returns [`LoadError::NotFound`] if the file does not exist and
/// [`LoadError::Io`] if it cannot be read as UTF-8 text.
#[instrument(level = "debug")]
pub fn load_document(path: &Path) -> Result<Document, LoadError> {
    read(path).map(Document::new)
}

/// Reads the evidence store.
///
/// No path, or a path that does not exist, yields an empty store.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
#[instrument(level = "debug")]
pub fn load_evidence(path: Option<&Path>) -> Result<EvidenceStore, LoadError> {
    let Some(path) = path.filter(|path| path.exists()) else {
        tracing::debug!("No evidence store, using an empty one");
        return Ok(EvidenceStore::default());
    };
    let content = read(path)?;
    serde_json::from_str(&content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the reference template, if one is given and exists.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
#[instrument(level = "debug")]
pub fn load_template(path: Option<&Path>) -> Result<Option<String>, LoadError> {
    match path {
        Some(path) if path.exists() => read(path).map(Some),
        Some(path) => {
            tracing::debug!("Template {} not found, skipping comparison", path.display());
            Ok(None)
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_document_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rfc.md");
        assert!(matches!(load_document(&path), Err(LoadError::NotFound(p)) if p == path));
    }

    #[test]
    fn reads_document_and_front_matter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rfc.md");
        fs::write(&path, "---\nstrictness: full\n---\n\n# RFC\n").unwrap();

        let document = load_document(&path).unwrap();
        assert_eq!(
            document.front_matter().unwrap().strictness.as_deref(),
            Some("full")
        );
    }

    #[test]
    fn missing_evidence_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_evidence(None).unwrap().is_empty());
        assert!(load_evidence(Some(&dir.path().join("evidence.json"))).unwrap().is_empty());
    }

    #[test]
    fn reads_evidence_items() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("evidence.json");
        fs::write(
            &path,
            r#"{"schema_version": "v1", "items": [{"evd_id": "EVD-001", "links_to": "SEC-HR-001"}]}"#,
        )
        .unwrap();

        let store = load_evidence(Some(&path)).unwrap();
        assert!(store.contains("EVD-001"));
        assert!(store.links("SEC-HR-001"));
    }

    #[test]
    fn malformed_evidence_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("evidence.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_evidence(Some(&path)), Err(LoadError::Json { .. })));
    }

    #[test]
    fn missing_template_is_skipped() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_template(Some(&dir.path().join("t.md"))).unwrap(), None);

        let path = dir.path().join("template.md");
        fs::write(&path, "# RFC\n## 1. 背景\n").unwrap();
        assert_eq!(
            load_template(Some(&path)).unwrap().as_deref(),
            Some("# RFC\n## 1. 背景\n")
        );
    }
}
