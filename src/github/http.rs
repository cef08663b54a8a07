use rand::Rng;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::debug;

use super::types::{ApiError, ErrorBody};

/// Retry schedule for lookups that opt into retries: exponential backoff from
/// 1s, plus jitter.
const RETRY_BASE_DELAY_SECS: u64 = 1;
const RETRY_JITTER_DIVISOR: u128 = 4; // + up to 25% jitter

pub(super) fn retry_base_delay(attempt: usize) -> Duration {
    let multiplier = 1u64.checked_shl(attempt as u32).unwrap_or(u64::MAX);
    Duration::from_secs(RETRY_BASE_DELAY_SECS.saturating_mul(multiplier))
}

pub(super) fn add_jitter(delay: Duration) -> Duration {
    let max_jitter_ms = delay.as_millis() / RETRY_JITTER_DIVISOR;
    if max_jitter_ms == 0 {
        return delay;
    }

    let max_jitter_ms = std::cmp::min(max_jitter_ms, u128::from(u64::MAX)) as u64;
    let jitter_ms = rand::thread_rng().gen_range(0..=max_jitter_ms);
    delay + Duration::from_millis(jitter_ms)
}

fn is_rate_limited(status: u16, headers: &HeaderMap) -> bool {
    if status == 429 {
        return true;
    }
    status == 403
        && headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim() == "0")
            .unwrap_or(false)
}

/// Send a request once and turn any non-2xx status into an [`ApiError`].
pub(super) async fn execute(request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
    let response = request.send().await.map_err(|err| {
        if err.is_timeout() {
            ApiError::transport(format!("request timed out: {}", err))
        } else {
            ApiError::transport(format!("request failed: {}", err))
        }
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = status.as_u16();
    let rate_limited = is_rate_limited(code, response.headers());
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or(body);

    debug!("GitHub API returned {}: {}", code, message);
    Err(ApiError::from_status(code, message, rate_limited))
}
