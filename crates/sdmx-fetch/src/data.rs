//! Data layer: immutable configuration for the fetch protocol.

use std::time::Duration;

/// Suffix of the staging file a deferred archive is downloaded into.
pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Bounds of the deferred-result poll loop.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use sdmx_fetch::PollPolicy;
///
/// let policy = PollPolicy::default()
///     .max_attempts(10)
///     .interval(Duration::from_secs(1));
/// assert_eq!(policy.max_wait(), Duration::from_secs(9));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total download attempts against the poll URL, including the first.
    ///
    /// Default: 60
    pub max_attempts: u32,

    /// Fixed pause after each not-found answer, except the last one.
    ///
    /// Default: 5s
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_secs(5),
        }
    }
}

impl PollPolicy {
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Upper bound of time spent sleeping before the loop gives up.
    pub fn max_wait(&self) -> Duration {
        self.interval
            .saturating_mul(self.max_attempts.saturating_sub(1))
    }
}
