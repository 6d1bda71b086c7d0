use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use sdmx_fs::StagingFile;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::data::{ARCHIVE_SUFFIX, PollPolicy};
use crate::effects::http::HttpClient;
use crate::effects::scan::scan_file_blocking;
use crate::error::{Error, Result};

/// Runs the retrieval protocol for one artifact.
///
/// A fetch downloads the requested URL into a fresh staging file. If the
/// response turns out to be a deferred-result notice, the announced archive
/// is polled for and its single document replaces the staged content. The
/// caller gets back a staging file holding the final payload.
pub struct Fetcher<C: HttpClient> {
    client: C,
    staging_dir: PathBuf,
    policy: PollPolicy,
}

impl<C: HttpClient> Fetcher<C> {
    /// `staging_dir` must exist before the first fetch.
    pub fn new(client: C, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            staging_dir: staging_dir.into(),
            policy: PollPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Retrieve `url` into a staging file named after `label` and `suffix`.
    ///
    /// Any error drops the staging file, which removes it.
    pub async fn fetch(&self, url: &str, label: &str, suffix: &str) -> Result<StagingFile> {
        let staging = StagingFile::create(&self.staging_dir, label, suffix)?;

        let bytes = self.download(url, staging.path()).await?;
        tracing::info!(url, bytes, "downloaded");

        let Some(poll_url) = scan_file_blocking(staging.path().to_path_buf()).await? else {
            return Ok(staging);
        };
        let poll_url = Url::parse(&poll_url).map_err(|e| Error::Malformed {
            path: staging.path().to_path_buf(),
            message: format!("footer announces an invalid poll URL '{poll_url}': {e}"),
        })?;
        tracing::info!(url, poll_url = %poll_url, "result deferred by the service");

        let archive = self.poll(poll_url.as_str(), label).await?;
        unwrap_archive(archive, staging.path().to_path_buf()).await?;
        Ok(staging)
    }

    /// Poll `url` until the archive it names exists.
    ///
    /// Not-found answers are retried up to [`PollPolicy::max_attempts`] times
    /// with [`PollPolicy::interval`] in between; any other failure ends the
    /// loop at once.
    pub async fn poll(&self, url: &str, label: &str) -> Result<StagingFile> {
        let archive = StagingFile::create(&self.staging_dir, label, ARCHIVE_SUFFIX)?;
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            match self.download(url, archive.path()).await {
                Ok(bytes) => {
                    tracing::info!(url, attempt, bytes, "deferred result retrieved");
                    return Ok(archive);
                }
                Err(e) if e.is_not_found() => {
                    tracing::info!(url, attempt, max_attempts, "deferred result not ready, retrying");
                    if attempt < max_attempts {
                        tokio::time::sleep(self.policy.interval).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        tracing::warn!(url, max_attempts, "gave up waiting for deferred result");
        Err(Error::PollExhausted {
            url: url.to_owned(),
            attempts: max_attempts,
        })
    }

    /// Stream the body of `url` into `destination`, replacing its content.
    ///
    /// Returns the number of bytes written. The file is fsynced before
    /// returning.
    pub async fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        Url::parse(url).map_err(|e| Error::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        tracing::debug!(url, destination = %destination.display(), "GET");

        let mut stream = self
            .client
            .stream(url)
            .await
            .map_err(|e| Self::map_error(url, e))?;

        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(Error::io(destination))?;

        let mut bytes_downloaded = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Self::map_error(url, e))?;
            file.write_all(&chunk).await.map_err(Error::io(destination))?;
            bytes_downloaded += chunk.len() as u64;
        }

        file.flush().await.map_err(Error::io(destination))?;
        file.sync_all().await.map_err(Error::io(destination))?;
        Ok(bytes_downloaded)
    }

    fn map_error(url: &str, e: C::Error) -> Error {
        if C::is_not_found(&e) {
            Error::NotFound {
                url: url.to_owned(),
            }
        } else {
            Error::Network {
                url: url.to_owned(),
                message: e.to_string(),
            }
        }
    }
}

async fn unwrap_archive(archive: StagingFile, destination: PathBuf) -> Result<()> {
    tokio::task::spawn_blocking(move || -> Result<()> {
        let extracted = sdmx_archive::unwrap_single(archive.path(), &destination)?;
        if extracted.bytes == 0 {
            tracing::warn!(entry = %extracted.name, "archive entry is empty");
        }
        Ok(())
    })
    .await?
}
