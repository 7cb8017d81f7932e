//! Typed failures the engine reports back to its callers.
//!
//! Command plumbing uses `anyhow`; these enums exist where a caller needs to
//! tell outcomes apart (a failed document versus a lookup miss on one row).

use std::path::PathBuf;

use thiserror::Error;

/// Opening or saving a spreadsheet document failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unsupported format: {0:?}")]
    UnsupportedFormat(PathBuf),

    #[error("cannot open {path:?}: {message}")]
    Open { path: PathBuf, message: String },

    #[error("cannot save {path:?}: {message}")]
    Save { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Why lookup enrichment did not apply to a row. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupMiss {
    #[error("no lookup table loaded")]
    NoTable,

    #[error("row has no key value")]
    EmptyKey,

    #[error("key '{0}' not found in lookup table")]
    UnknownKey(String),
}

/// The schema file could not be turned into schema entries.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema file {0:?} not found")]
    Missing(PathBuf),

    #[error("unsupported schema extension for {0:?} (expected .json, .yml or .yaml)")]
    UnsupportedExtension(PathBuf),

    #[error("cannot read schema file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse schema file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("cannot write schema file {path:?}: {message}")]
    Write { path: PathBuf, message: String },
}
