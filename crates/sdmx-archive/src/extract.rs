use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use crate::error::{Error, Result};

/// Index of the entry that carries the payload.
///
/// The deferred-result archives served by the statistics endpoint hold a
/// single document. Nothing in the service contract guarantees that; if an
/// archive ever carries more, only this entry is used and the rest are
/// reported in [`Extracted::ignored`].
pub const PAYLOAD_ENTRY: usize = 0;

/// What was taken out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub name: String,
    pub bytes: u64,
    /// Entries present in the archive besides the payload.
    pub ignored: usize,
}

pub struct ZipSource<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = zip::ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Stream the payload entry into `writer`.
    pub fn unwrap_into<W: Write>(&mut self, writer: &mut W) -> Result<Extracted> {
        let total = self.archive.len();
        if total <= PAYLOAD_ENTRY {
            return Err(Error::Empty);
        }

        let mut entry = self.archive.by_index(PAYLOAD_ENTRY)?;
        let name = entry.name().to_owned();
        let bytes = std::io::copy(&mut entry, writer)?;

        let ignored = total - 1;
        if ignored > 0 {
            tracing::warn!(entry = %name, ignored, "archive has more than one entry, using the first");
        }

        Ok(Extracted {
            name,
            bytes,
            ignored,
        })
    }
}

/// Unwrap the payload of the zip archive at `archive` into `destination`.
///
/// `destination` is truncated first and fsynced after the copy.
pub fn unwrap_single(archive: &Path, destination: &Path) -> Result<Extracted> {
    let file = File::open(archive).map_err(|source| Error::Open {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut source = ZipSource::new(BufReader::new(file))?;

    let out = File::create(destination).map_err(|source| Error::Write {
        path: destination.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(out);
    let extracted = source.unwrap_into(&mut writer)?;

    let out = writer.into_inner().map_err(|e| Error::Write {
        path: destination.to_path_buf(),
        source: e.into_error(),
    })?;
    out.sync_all().map_err(|source| Error::Write {
        path: destination.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        archive = %archive.display(),
        entry = %extracted.name,
        bytes = extracted.bytes,
        "unwrapped archive"
    );
    Ok(extracted)
}
