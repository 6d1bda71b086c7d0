//! Retrieval of SDMX artifacts from a statistics web service.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable configuration ([`PollPolicy`])
//! - [`core`](crate::core) - Pure state machines ([`FooterScanner`](crate::core::FooterScanner))
//! - [`effects`] - I/O operations behind the [`HttpClient`] trait
//!
//! # Protocol
//!
//! 1. The artifact URL is streamed to a fresh staging file.
//! 2. The staged document is scanned, one markup event at a time, for a
//!    footer message announcing a deferred result.
//! 3. If one is found, the announced URL is polled until the zip archive it
//!    names exists, and the archive's single entry replaces the staged
//!    content.
//!
//! Placing the staged file into a cache is left to the caller.

pub mod core;
pub mod data;
pub mod effects;
mod error;
pub mod mock;

pub use data::{ARCHIVE_SUFFIX, PollPolicy};
pub use effects::{BoxStream, Fetcher, HttpClient, scan_file};
pub use error::{Error, Result};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;
