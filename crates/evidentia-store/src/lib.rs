//! Evidentia Storage Layer
//!
//! Implements the [`Repository`] trait over two interchangeable backends:
//!
//! - [`JsonStore`]: one JSON document holding the whole snapshot
//! - [`SqliteStore`]: SQLite tables with foreign keys and lookup indexes
//!
//! Both validate the snapshot on load and on save, so neither can hand out or
//! persist a registry that breaks the domain invariants.
//!
//! # Examples
//!
//! ```no_run
//! use evidentia_domain::Repository;
//! use evidentia_store::RegistryStore;
//!
//! let store = RegistryStore::open("studies.json", None).unwrap();
//! let snapshot = store.load().unwrap();
//! println!("{} studies", snapshot.studies.len());
//! ```

#![warn(missing_docs)]

pub mod json;
pub mod sqlite;

use evidentia_domain::{DomainError, Repository, Snapshot};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use json::JsonStore;
pub use sqlite::SqliteStore;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem error
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The persisted snapshot could not be decoded
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// File or table being decoded
        path: PathBuf,
        /// Decoder message
        message: String,
    },

    /// The snapshot breaks a domain invariant
    #[error(transparent)]
    Invalid(#[from] DomainError),

    /// Unknown backend name
    #[error("Unknown store backend: {0} (expected json or sqlite)")]
    UnknownBackend(String),
}

/// Physical storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Single JSON document
    Json,
    /// SQLite database
    Sqlite,
}

impl Backend {
    /// Pick a backend from the file extension: `.db`/`.sqlite`/`.sqlite3` are
    /// SQLite, anything else is a JSON document
    pub fn infer(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("db" | "sqlite" | "sqlite3") => Backend::Sqlite,
            _ => Backend::Json,
        }
    }

    /// Parse a backend name
    pub fn parse(name: &str) -> Result<Self, StoreError> {
        match name.trim().to_lowercase().as_str() {
            "json" => Ok(Backend::Json),
            "sqlite" | "sqlite3" | "db" => Ok(Backend::Sqlite),
            other => Err(StoreError::UnknownBackend(other.to_string())),
        }
    }
}

/// A repository whose backend is chosen at runtime
#[derive(Debug)]
pub enum RegistryStore {
    /// JSON document backend
    Json(JsonStore),
    /// SQLite backend
    Sqlite(SqliteStore),
}

impl RegistryStore {
    /// Open the store at `path`, inferring the backend when not given
    pub fn open(path: impl AsRef<Path>, backend: Option<Backend>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        match backend.unwrap_or_else(|| Backend::infer(path)) {
            Backend::Json => Ok(RegistryStore::Json(JsonStore::new(path))),
            Backend::Sqlite => Ok(RegistryStore::Sqlite(SqliteStore::new(path)?)),
        }
    }

    /// Location of the store
    pub fn path(&self) -> &Path {
        match self {
            RegistryStore::Json(store) => store.path(),
            RegistryStore::Sqlite(store) => store.path(),
        }
    }

    /// Which backend is in use
    pub fn backend(&self) -> Backend {
        match self {
            RegistryStore::Json(_) => Backend::Json,
            RegistryStore::Sqlite(_) => Backend::Sqlite,
        }
    }
}

impl Repository for RegistryStore {
    type Error = StoreError;

    fn load(&self) -> Result<Snapshot, Self::Error> {
        match self {
            RegistryStore::Json(store) => store.load(),
            RegistryStore::Sqlite(store) => store.load(),
        }
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        match self {
            RegistryStore::Json(store) => store.save(snapshot),
            RegistryStore::Sqlite(store) => store.save(snapshot),
        }
    }

    fn exists(&self) -> bool {
        match self {
            RegistryStore::Json(store) => store.exists(),
            RegistryStore::Sqlite(store) => store.exists(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_inference() {
        assert_eq!(Backend::infer(Path::new("studies.json")), Backend::Json);
        assert_eq!(Backend::infer(Path::new("registry.db")), Backend::Sqlite);
        assert_eq!(Backend::infer(Path::new("data/registry.sqlite")), Backend::Sqlite);
        assert_eq!(Backend::infer(Path::new("studies")), Backend::Json);
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!(Backend::parse("SQLite").unwrap(), Backend::Sqlite);
        assert!(matches!(Backend::parse("csv"), Err(StoreError::UnknownBackend(_))));
    }
}
