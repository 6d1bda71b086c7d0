use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Short code of a dataset, e.g. `une_rt_m`.
///
/// The code ends up both in a URL path segment and in a file name, so only
/// ASCII alphanumerics, `_`, `-` and `.` are accepted, and it may not start
/// with a dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        let reason = if code.is_empty() {
            Some("empty")
        } else if code.starts_with('.') {
            Some("starts with '.'")
        } else if !code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
        {
            Some("only ASCII letters, digits, '_', '-' and '.' are allowed")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(Error::InvalidDatasetId { id: code, reason }),
            None => Ok(Self(code)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DatasetId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for DatasetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two artifacts the service publishes per dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// The data structure definition (metadata).
    StructureDefinition,
    /// The bulk data document.
    Data,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::StructureDefinition, ArtifactKind::Data];

    /// Suffix appended to the dataset code to form the cache file name.
    pub fn cache_suffix(self) -> &'static str {
        match self {
            ArtifactKind::StructureDefinition => "_dsd.xml",
            ArtifactKind::Data => "_data.sdmx.xml",
        }
    }

    pub fn file_name(self, id: &DatasetId) -> String {
        format!("{id}{}", self.cache_suffix())
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::StructureDefinition => write!(f, "structure definition"),
            ArtifactKind::Data => write!(f, "data"),
        }
    }
}
