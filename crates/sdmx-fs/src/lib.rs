//! Staging files and atomic promotion for the SDMX artifact cache.
//!
//! - [`StagingFile`] - randomized, exclusively owned scratch file, removed on drop
//! - [`promote`] - atomic rename of a staging file into its final location
//! - [`ensure_dir`] - one-time directory creation for startup

mod error;
mod promote;
mod staging;

pub use error::{Error, Result};
pub use promote::promote;
pub use staging::StagingFile;

use std::path::Path;

/// Create `path` and its parents if absent.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "created directory");
    Ok(())
}
