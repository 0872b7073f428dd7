// Retry logic with Google retryDelay hint support

use backoff::{backoff::Backoff, ExponentialBackoff};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const MAX_HINT_SECONDS: f64 = 10.0;

/// Parse Google's retryDelay hint out of an error body.
/// The hint is capped at 10 seconds; callers bound the whole call anyway.
pub fn parse_retry_delay(error_json: &str) -> Option<Duration> {
    let parsed: Value = serde_json::from_str(error_json).ok()?;

    // Navigate: error.details[] -> find RetryInfo -> retryDelay
    let details = parsed.get("error")?.get("details")?.as_array()?;

    for detail in details {
        if detail.get("@type")?.as_str()? == "type.googleapis.com/google.rpc.RetryInfo" {
            if let Some(retry_delay) = detail.get("retryDelay").and_then(|v| v.as_str()) {
                return parse_duration_string(retry_delay);
            }
        }
    }

    None
}

/// Parse duration strings like "0.457639761s", "40s", "1.5s"
fn parse_duration_string(duration_str: &str) -> Option<Duration> {
    // Remove 's' suffix and parse as float
    let seconds_str = duration_str.strip_suffix('s')?;
    let seconds: f64 = seconds_str.parse().ok()?;

    let capped_seconds = seconds.clamp(0.0, MAX_HINT_SECONDS);

    let millis = (capped_seconds * 1000.0) as u64;
    Some(Duration::from_millis(millis))
}

/// Create exponential backoff configuration for retries
pub fn create_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        current_interval: Duration::from_millis(250),    // Start at 250ms
        initial_interval: Duration::from_millis(250),
        randomization_factor: 0.3,                        // Add jitter
        multiplier: 2.0,                                 // Double each time
        max_interval: Duration::from_secs(4),
        max_elapsed_time: Some(Duration::from_secs(10)), // Matches the default call bound
        ..Default::default()
    }
}

/// Determine if an HTTP status code is retryable
pub fn is_retryable(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Execute operation with retry logic
/// - Uses Google's retryDelay hint if available
/// - Falls back to exponential backoff
/// - Gives up after `max_attempts` (at least one attempt is made)
///
/// Callers wrap the returned future in a timeout to bound total latency.
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    max_attempts: u32,
    mut operation: F,
) -> Result<T, (u16, String)>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, (u16, String)>>,
{
    let mut backoff = create_backoff();
    let mut attempt = 0;
    let max_attempts = max_attempts.max(1);

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result);
            }
            Err((status, error_body)) => {
                if !is_retryable(status) || attempt >= max_attempts {
                    // Non-retryable error or max attempts reached
                    return Err((status, error_body));
                }

                // Try to parse Google's retry hint
                let delay = if let Some(google_delay) = parse_retry_delay(&error_body) {
                    debug!(
                        "{} failed with {} (attempt {}), Google suggests waiting {}ms",
                        operation_name,
                        status,
                        attempt,
                        google_delay.as_millis()
                    );
                    google_delay
                } else {
                    // Fall back to exponential backoff
                    let backoff_delay = match backoff.next_backoff() {
                        Some(delay) => delay,
                        None => return Err((status, error_body)),
                    };
                    debug!(
                        "{} failed with {} (attempt {}), retrying after {}ms",
                        operation_name,
                        status,
                        attempt,
                        backoff_delay.as_millis()
                    );
                    backoff_delay
                };

                // Wait before retry
                tokio::time::sleep(delay).await;
            }
        }
    }
}
