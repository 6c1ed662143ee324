//! Bounded exponential backoff around a single download attempt

use std::future::Future;
use std::time::{Duration, Instant};

use backoff::ExponentialBackoff;
use backoff::ExponentialBackoffBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{DownloadError, Result};

/// How failed attempts are retried.
///
/// Every failure is treated as transient. Once `max_elapsed_time` has passed
/// since the first attempt the last error is returned wrapped in
/// [`DownloadError::RetriesExhausted`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Delay before the first retry
    #[serde(with = "humantime_serde")]
    pub initial_interval: Duration,

    /// Growth factor applied to the delay after each retry
    pub multiplier: f64,

    /// Jitter, as a fraction of the current delay
    pub randomization_factor: f64,

    /// Upper bound for a single delay
    #[serde(with = "humantime_serde")]
    pub max_interval: Duration,

    /// Total time budget, measured from the first attempt
    #[serde(with = "humantime_serde")]
    pub max_elapsed_time: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            multiplier: 1.5,
            randomization_factor: 0.5,
            max_interval: Duration::from_secs(60),
            max_elapsed_time: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Build a fresh backoff schedule, starting now
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_multiplier(self.multiplier)
            .with_randomization_factor(self.randomization_factor)
            .with_max_interval(self.max_interval)
            .with_max_elapsed_time(Some(self.max_elapsed_time))
            .build()
    }

    /// Run `attempt` until it succeeds or the time budget runs out
    pub async fn run<T, F, Fut>(&self, url: &str, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let started = Instant::now();

        backoff::future::retry_notify(
            self.backoff(),
            || {
                let fut = attempt();
                async move { fut.await.map_err(backoff::Error::transient) }
            },
            |err: DownloadError, delay: Duration| {
                tracing::debug!(url, error = %err, ?delay, "Download failed, retrying");
            },
        )
        .await
        .map_err(|source| DownloadError::RetriesExhausted {
            url: url.to_string(),
            elapsed: started.elapsed(),
            source: Box::new(source),
        })
    }
}
