pub mod logging;
pub mod retry;

pub use retry::{retry_with_exponential_backoff, RetryConfig};

/// Collapse internal whitespace and trim; used on titles before storing.
pub fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}
