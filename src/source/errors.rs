use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: crate::edit::EditError,
    },

    #[error("{path} is not kept in memory (write-through mode has no original snapshot)")]
    NotInMemory { path: PathBuf },

    #[error("failed to scan source directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("source directory does not exist: {0}")]
    MissingDirectory(PathBuf),
}
