use std::path::PathBuf;

use thiserror::Error;

use relval_core::IdentifierError;
use relval_store::StoreError;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error("Store query failed for category {category:?}: {source}")]
    StoreQuery {
        category: String,
        #[source]
        source: StoreError,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("There are still {count} missing IDs. See {}", .path.display())]
    UnattributedResidual { count: usize, path: PathBuf },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Can't write report {}: {source}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
