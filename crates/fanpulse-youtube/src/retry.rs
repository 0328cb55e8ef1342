//! Retry with exponential back-off and jitter for the oEmbed client.
//!
//! Every error is first sorted by [`classify`]; only [`FailureClass::Retryable`]
//! errors reach another attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::OEmbedError;

const MAX_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Worth another attempt after a back-off delay.
    Retryable,
    /// Retrying cannot change the answer.
    Terminal,
}

/// Sorts an oEmbed failure into retryable or terminal.
///
/// **Terminal:**
/// - Any 4xx other than 429: the video is deleted, private or embedding is
///   disabled.
/// - A malformed base URL.
///
/// **Retryable:** everything else, including timeouts, refused or dropped
/// connections, truncated bodies, 429, 5xx and bodies that do not decode.
#[must_use]
pub fn classify(err: &OEmbedError) -> FailureClass {
    let terminal = match err {
        OEmbedError::Http(e) => e.status().is_some_and(is_terminal_status),
        OEmbedError::Status { status, .. } => {
            reqwest::StatusCode::from_u16(*status).is_ok_and(is_terminal_status)
        }
        OEmbedError::InvalidBaseUrl { .. } => true,
        OEmbedError::Deserialize { .. } => false,
    };
    if terminal {
        FailureClass::Terminal
    } else {
        FailureClass::Retryable
    }
}

fn is_terminal_status(status: reqwest::StatusCode) -> bool {
    status.is_client_error() && status != reqwest::StatusCode::TOO_MANY_REQUESTS
}

/// Back-off before retry number `attempt` (1-based): `base × 2^(attempt-1)`,
/// capped at 60 s, then scaled by a random factor in `[0.75, 1.25)`.
fn backoff_delay_ms(base_ms: u64, attempt: u32) -> u64 {
    let computed = base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
    delay_ms
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// retryable errors, so at most `max_retries + 1` calls in total.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, OEmbedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OEmbedError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if classify(&err) == FailureClass::Terminal || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_delay_ms(backoff_base_ms, attempt);
                tracing::debug!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "oEmbed transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
