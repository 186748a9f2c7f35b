use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentifierError {
    #[error("Malformed identifier {token:?} in {}, line {line}", .path.display())]
    MalformedIdentifier {
        path: PathBuf,
        line: usize,
        token: String,
    },

    #[error("Can't read file {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Can't write file {}: {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IdentifierError>;
