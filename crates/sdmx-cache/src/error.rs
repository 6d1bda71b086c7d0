use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::artifact::ArtifactKind;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid dataset identifier '{id}': {reason}")]
    InvalidDatasetId { id: String, reason: &'static str },

    #[error("no cached {kind} for dataset '{id}'")]
    NotCached { id: String, kind: ArtifactKind },

    #[error("{operation} is not implemented")]
    Unsupported { operation: &'static str },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Figment(#[from] figment::Error),

    #[error("cache I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Fs(#[from] sdmx_fs::Error),

    #[error(transparent)]
    Fetch(#[from] sdmx_fetch::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e.to_string())
    }
}
