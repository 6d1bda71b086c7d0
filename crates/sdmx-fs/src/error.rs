use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create staging file in '{dir}': {source}")]
    Staging {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to promote '{from}' to '{to}': {source}")]
    Promote {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("path has no parent directory: '{0}'")]
    NoParent(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The underlying I/O error, if any.
    pub fn io(&self) -> Option<&std::io::Error> {
        match self {
            Self::Read { source, .. }
            | Self::Write { source, .. }
            | Self::Staging { source, .. }
            | Self::Promote { source, .. } => Some(source),
            Self::NoParent(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.io()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
    }
}
