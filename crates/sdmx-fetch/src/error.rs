//! Error types for sdmx-fetch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("resource not found: {url}")]
    NotFound { url: String },

    #[error("download of {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("deferred result at {url} still unavailable after {attempts} attempts")]
    PollExhausted { url: String, attempts: u32 },

    #[error("malformed response in '{path}': {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("file I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Fs(#[from] sdmx_fs::Error),

    #[error("archive error: {0}")]
    Archive(#[from] sdmx_archive::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The remote resource does not exist (yet).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The service answered, but with content that cannot be used.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::Malformed { .. }
                | Self::Archive(sdmx_archive::Error::Empty | sdmx_archive::Error::Corrupted(_))
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e.to_string())
    }
}
