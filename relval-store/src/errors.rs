use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unknown collection {collection:?}: no export found under {}", .root.display())]
    UnknownCollection { collection: String, root: PathBuf },

    #[error("Invalid document in collection {collection:?} at line {line}: {source}")]
    InvalidDocument {
        collection: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid field path {0:?}")]
    InvalidFieldPath(String),

    #[error("Query on collection {collection:?} exceeded its timeout ({elapsed:?})")]
    Timeout {
        collection: String,
        elapsed: Duration,
    },

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Identifier(#[from] relval_core::IdentifierError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
