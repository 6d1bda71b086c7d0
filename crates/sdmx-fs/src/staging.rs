use std::fmt;
use std::path::Path;

use tempfile::TempPath;

use crate::{Error, Result};

/// Random characters in a staging file name.
const RAND_BYTES: usize = 12;

/// An exclusively owned file in the staging directory.
///
/// The file is created with `O_EXCL` semantics under a randomized name, so two
/// in-flight retrievals never share a staging file. It is removed when dropped
/// unless it has been handed to [`promote`](crate::promote).
pub struct StagingFile {
    pub(crate) path: TempPath,
}

impl StagingFile {
    /// Create an empty staging file named `{label}-{random}{suffix}` in `dir`.
    ///
    /// `dir` must already exist.
    pub fn create(dir: impl AsRef<Path>, label: &str, suffix: &str) -> Result<Self> {
        let dir = dir.as_ref();
        let prefix = format!("{label}-");
        let file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(suffix)
            .rand_bytes(RAND_BYTES)
            .tempfile_in(dir)
            .map_err(|source| Error::Staging {
                dir: dir.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the staged content in bytes.
    pub fn len(&self) -> Result<u64> {
        std::fs::metadata(self.path())
            .map(|m| m.len())
            .map_err(|source| Error::Read {
                path: self.path().to_path_buf(),
                source,
            })
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }
}

impl fmt::Debug for StagingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagingFile")
            .field("path", &self.path())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_staging_names_are_unique() -> Result<()> {
        let dir = tempdir().unwrap();
        let a = StagingFile::create(dir.path(), "nama_10_gdp", "_dsd.xml")?;
        let b = StagingFile::create(dir.path(), "nama_10_gdp", "_dsd.xml")?;
        assert_ne!(a.path(), b.path());

        let name = a.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("nama_10_gdp-"));
        assert!(name.ends_with("_dsd.xml"));
        Ok(())
    }

    #[test]
    fn test_staging_removed_on_drop() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = {
            let staging = StagingFile::create(dir.path(), "x", ".zip")?;
            std::fs::write(staging.path(), b"partial").unwrap();
            assert_eq!(staging.len()?, 7);
            staging.path().to_path_buf()
        };
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_staging_requires_existing_dir() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = StagingFile::create(&missing, "x", ".xml").unwrap_err();
        assert!(matches!(err, Error::Staging { .. }));
        assert!(err.is_not_found());
    }
}
