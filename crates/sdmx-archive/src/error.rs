use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("archive is corrupted: {0}")]
    Corrupted(String),

    #[error("archive contains no entries")]
    Empty,

    #[error("failed to read archive '{path}': {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to write extracted entry to '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Self::Corrupted(e.to_string())
            }
            zip::result::ZipError::Io(e) => Self::Io(e),
            other => Self::Corrupted(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
