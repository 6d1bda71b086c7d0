use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sdmx_fs::StagingFile;
use tokio::fs::File;

use crate::artifact::{ArtifactKind, DatasetId};
use crate::error::{Error, Result};

/// One file per (dataset, artifact kind) under a single directory.
///
/// Entries are only ever created or replaced by promoting a staging file, so
/// a reader opening an entry sees either the previous complete content or the
/// new complete content.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Canonical location of the entry for `(id, kind)`.
    pub fn path(&self, id: &DatasetId, kind: ArtifactKind) -> PathBuf {
        self.dir.join(kind.file_name(id))
    }

    pub async fn has(&self, id: &DatasetId, kind: ArtifactKind) -> bool {
        tokio::fs::metadata(self.path(id, kind))
            .await
            .is_ok_and(|meta| meta.is_file())
    }

    pub async fn open(&self, id: &DatasetId, kind: ArtifactKind) -> Result<File> {
        let path = self.path(id, kind);
        File::open(&path).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                Error::NotCached {
                    id: id.to_string(),
                    kind,
                }
            } else {
                Error::Io { path, source }
            }
        })
    }

    /// Install `staging` as the entry for `(id, kind)`, replacing any
    /// previous entry in a single rename.
    pub async fn replace(
        &self,
        id: &DatasetId,
        kind: ArtifactKind,
        staging: StagingFile,
    ) -> Result<()> {
        let destination = self.path(id, kind);
        let bytes = staging.len()?;
        let target = destination.clone();
        tokio::task::spawn_blocking(move || sdmx_fs::promote(staging, target)).await??;
        tracing::info!(%id, %kind, bytes, path = %destination.display(), "cache entry installed");
        Ok(())
    }
}
