//! Unwrapping of the zip archives that carry deferred SDMX results.
//!
//! A deferred result is delivered as a zip holding one document. Extraction
//! streams that entry straight into a caller-provided file; nothing is
//! unpacked onto disk under archive-controlled names.

mod error;
mod extract;

pub use error::{Error, Result};
pub use extract::{Extracted, PAYLOAD_ENTRY, ZipSource, unwrap_single};
