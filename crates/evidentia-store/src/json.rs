//! Single-document JSON backend

use crate::StoreError;
use evidentia_domain::{Repository, Snapshot};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores the whole snapshot as one pretty-printed JSON object with keys
/// `studies`, `claims`, `study_claims`, `evidence_usage`, `removed_studies`
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Create a store backed by `path`; nothing is read until [`Repository::load`]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Repository for JsonStore {
    type Error = StoreError;

    fn load(&self) -> Result<Snapshot, Self::Error> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no registry document yet, starting empty");
            return Ok(Snapshot::new());
        }

        let text = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let snapshot: Snapshot = serde_json::from_str(&text).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        snapshot.validate()?;

        debug!(
            path = %self.path.display(),
            studies = snapshot.studies.len(),
            claims = snapshot.claims.len(),
            "loaded registry document"
        );
        Ok(snapshot)
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        snapshot.validate()?;

        let text = serde_json::to_string_pretty(snapshot).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        // Write beside the target and rename so a crash never leaves half a document
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, text + "\n").map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        debug!(
            path = %self.path.display(),
            studies = snapshot.studies.len(),
            "saved registry document"
        );
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("studies.json"));
        assert!(!store.exists());
        assert_eq!(store.load().unwrap(), Snapshot::new());
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("studies.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Parse { .. })));
        // the bad file is left untouched
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::new(dir.path().join("nested/deeper/studies.json"));
        store.save(&Snapshot::new()).unwrap();
        assert!(store.exists());
    }

    #[test]
    fn test_document_keys() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::new(dir.path().join("studies.json"));
        store.save(&Snapshot::new()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        for key in ["studies", "claims", "study_claims", "evidence_usage", "removed_studies"] {
            assert!(raw.get(key).is_some(), "missing key {}", key);
        }
    }
}
