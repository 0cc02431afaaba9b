//! Exponential backoff for transient directory API failures.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Only rate limiting and network-level failures are worth another try.
/// A 404, any other status, or a body that does not parse will fail the
/// same way again.
fn is_retriable(err: &ClientError) -> bool {
    matches!(err, ClientError::RateLimited { .. } | ClientError::Http(_))
}

/// Run `operation`, retrying transient errors up to `max_retries` more times.
///
/// The wait before retry `n` (1-based) is `backoff_base_secs * 2^(n-1)`
/// seconds, so with a base of 1 and three retries the waits are 1, 2 and 4
/// seconds. The last error is returned once retries run out.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retriable(&err) || attempt >= max_retries => return Err(err),
            Err(err) => err,
        };

        // Saturate instead of overflowing on extreme configs.
        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient directory API error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
