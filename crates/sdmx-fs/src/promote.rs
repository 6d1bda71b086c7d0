use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use crate::{Error, Result, StagingFile};

/// Move a staging file to `destination`, replacing whatever is there.
///
/// The rename is atomic: readers of `destination` see either the previous
/// content or the complete new content, never a missing or partial file.
/// When staging and destination sit on different filesystems the content is
/// copied into a temporary file next to `destination`, fsynced, and renamed.
pub fn promote(staging: StagingFile, destination: impl AsRef<Path>) -> Result<()> {
    let destination = destination.as_ref();
    let from = staging.path().to_path_buf();

    match staging.path.persist(destination) {
        Ok(()) => {
            sync_parent(destination);
            tracing::debug!(from = %from.display(), to = %destination.display(), "promoted");
            Ok(())
        }
        Err(err) if err.error.kind() == ErrorKind::CrossesDevices => {
            tracing::debug!(
                from = %from.display(),
                to = %destination.display(),
                "staging is on another filesystem, copying"
            );
            // err.path still owns the staging file and removes it when dropped.
            copy_into_place(&err.path, destination)
        }
        Err(err) => Err(Error::Promote {
            from,
            to: destination.to_path_buf(),
            source: err.error,
        }),
    }
}

pub(crate) fn copy_into_place(source: &Path, destination: &Path) -> Result<()> {
    let parent = parent_dir(destination);

    let mut target = tempfile::Builder::new()
        .prefix(".promote-")
        .tempfile_in(parent)
        .map_err(|e| Error::Staging {
            dir: parent.to_path_buf(),
            source: e,
        })?;

    let mut reader = File::open(source).map_err(|e| Error::Read {
        path: source.to_path_buf(),
        source: e,
    })?;
    std::io::copy(&mut reader, target.as_file_mut()).map_err(|e| Error::Write {
        path: target.path().to_path_buf(),
        source: e,
    })?;
    target.as_file().sync_all().map_err(|e| Error::Write {
        path: target.path().to_path_buf(),
        source: e,
    })?;

    target.persist(destination).map_err(|e| Error::Promote {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        source: e.error,
    })?;
    sync_parent(destination);
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn sync_parent(path: &Path) {
    if let Ok(dir) = File::open(parent_dir(path)) {
        let _ = dir.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) {}
