//! Retry with linear backoff for calls that may be rejected by the user.

use std::future::Future;
use std::time::Duration;

/// EIP-1193 "User Rejected Request".
pub const USER_REJECTED_CODE: i64 = 4001;

const REJECTION_PHRASES: [&str; 4] = [
    "user rejected",
    "user denied",
    "rejected the request",
    "request rejected",
];

/// Errors that can tell a deliberate user rejection apart from a transient failure.
pub trait Retryable {
    fn is_user_rejection(&self) -> bool;
}

/// Case-insensitive check for the messages wallets use when the user declines.
pub fn is_user_rejection_message(message: &str) -> bool {
    let message = message.to_lowercase();
    REJECTION_PHRASES.iter().any(|p| message.contains(p))
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay after the first failure; the n-th failure waits `n * base_delay`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Run `op` until it succeeds, fails with a user rejection, or runs out of attempts.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_user_rejection() => {
                tracing::debug!("Not retrying user rejection: {}", e);
                return Err(e);
            }
            Err(e) if attempt >= policy.max_attempts => {
                tracing::warn!(attempt, "Giving up: {}", e);
                return Err(e);
            }
            Err(e) => {
                let delay = policy.base_delay * attempt;
                tracing::warn!(attempt, ?delay, "Attempt failed, retrying: {}", e);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
