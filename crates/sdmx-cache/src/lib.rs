//! Local cache of SDMX structure definitions and data documents.
//!
//! [`DatasetClient`] answers requests for a dataset's artifacts from a cache
//! directory and falls back to the remote service on a miss or a forced
//! refresh. Retrieval, including the service's deferred-result protocol, is
//! done by [`sdmx_fetch`]; new content is staged and promoted with
//! [`sdmx_fs`], so a cache entry is never observed partially written.
//!
//! ```no_run
//! # async fn run() -> sdmx_cache::Result<()> {
//! use sdmx_cache::{ClientConfig, DatasetClient};
//! use tokio::io::AsyncReadExt;
//!
//! let config = ClientConfig::load(None)?;
//! sdmx_cache::initialize(&config)?;
//!
//! let client = DatasetClient::from_config(config)?;
//! let mut dsd = client.get_metadata("une_rt_m", false).await?;
//! let mut xml = String::new();
//! dsd.read_to_string(&mut xml).await.ok();
//! # Ok(())
//! # }
//! ```

mod artifact;
mod client;
mod config;
mod error;
mod store;

pub use artifact::{ArtifactKind, DatasetId};
pub use client::DatasetClient;
pub use config::{
    ClientConfig, DEFAULT_DATA_URL_TEMPLATE, DEFAULT_METADATA_URL_TEMPLATE, ID_PLACEHOLDER,
};
pub use error::{Error, Result};
pub use store::CacheStore;

/// Create the cache and staging directories named by `config`.
///
/// Call once at startup, before the first request; nothing else creates
/// directories.
pub fn initialize(config: &ClientConfig) -> Result<()> {
    sdmx_fs::ensure_dir(&config.cache_dir)?;
    sdmx_fs::ensure_dir(&config.staging_dir)?;
    Ok(())
}
