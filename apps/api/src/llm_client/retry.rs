use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

/// Bounded fixed-backoff retry policy for transient-busy responses.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of calls, including the first one.
    pub max_attempts: u32,
    /// Wait between consecutive calls.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_secs(10),
        }
    }
}

/// Phrases a provider puts in its `error` field while a model is overloaded or still loading.
const BUSY_MARKERS: [&str; 3] = ["too busy", "currently loading", "overloaded"];

/// The retry predicate: true when a non-success response means "try again later".
///
/// 503 and 529 are always transient. Other statuses are transient only when the structured
/// `error` field carries one of the busy markers. 429 is a quota failure, not a busy signal.
pub fn is_transient_busy(status: StatusCode, body: &str) -> bool {
    if status.is_success() || status == StatusCode::TOO_MANY_REQUESTS {
        return false;
    }
    if status == StatusCode::SERVICE_UNAVAILABLE || status.as_u16() == 529 {
        return true;
    }
    structured_error(body)
        .map(|message| {
            let message = message.to_lowercase();
            BUSY_MARKERS.iter().any(|m| message.contains(m))
        })
        .unwrap_or(false)
}

/// Server-reported error text: `error` as a string, `error.message`, or the raw body.
pub fn error_message(body: &str) -> String {
    structured_error(body).unwrap_or_else(|| body.trim().to_string())
}

fn structured_error(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj.get("message")?.as_str().map(String::from),
        _ => None,
    }
}
