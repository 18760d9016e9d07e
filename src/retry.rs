//! Retry logic with exponential backoff for image fetches
//!
//! Image hosts fail in two ways: transiently (timeouts, resets, 429/5xx) and
//! permanently (404, malformed URL). Only the former are worth another attempt.
//! With the default [`RetryConfig`] no retries happen and the first failure is final.

use crate::config::RetryConfig;
use crate::error::FetchError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout { .. } => true,
            FetchError::InvalidUrl { .. } => false,
            FetchError::Request(_) => true,
            FetchError::Status { status } => {
                matches!(*status, 408 | 429) || (500..=599).contains(status)
            }
            // Body truncated mid-transfer
            FetchError::Body(_) => true,
        }
    }
}

/// Execute an async operation with exponential backoff retry logic
///
/// Makes one attempt plus up to `config.max_retries` retries, sleeping between
/// attempts. Returns the first success or the last error.
///
/// # Example
///
/// ```no_run
/// use tribute_archive::retry::fetch_with_retry;
/// use tribute_archive::config::RetryConfig;
/// use tribute_archive::error::FetchError;
///
/// # async fn example() -> Result<(), FetchError> {
/// let config = RetryConfig { max_retries: 2, ..Default::default() };
/// let bytes = fetch_with_retry(&config, || async {
///     Ok::<Vec<u8>, FetchError>(vec![0xFF, 0xD8])
/// }).await?;
/// # Ok(())
/// # }
/// ```
pub async fn fetch_with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::debug!(attempts = attempt + 1, "fetch succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                attempt += 1;

                tracing::debug!(
                    error = %e,
                    attempt = attempt,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis(),
                    "fetch failed, retrying"
                );

                let wait = if config.jitter { add_jitter(delay) } else { delay };
                tokio::time::sleep(wait).await;

                // Products too large for a Duration saturate at max_delay
                delay = Duration::try_from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier)
                    .map_or(config.max_delay, |next| next.min(config.max_delay));
            }
            Err(e) => return Err(e),
        }
    }
}

/// Add random jitter to a delay
///
/// The result lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::try_from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor)).unwrap_or(delay)
}
