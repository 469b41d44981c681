use crate::error::{AppError, AppResult};
use log::{debug, info, warn};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Single attempt, no waiting.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-transient error, or
/// runs out of attempts. Only `PersistenceUnavailable` is retried.
pub async fn retry_with_exponential_backoff<T, F, Fut>(
    config: &RetryConfig,
    operation: F,
) -> AppResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = AppResult<T>>,
{
    let attempts = config.max_attempts.max(1);
    let mut delay = config.base_delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!("Operation succeeded on attempt {}", attempt);
                }
                return Ok(value);
            }
            Err(e) if !e.is_transient() => {
                debug!("Attempt {} failed with non-transient error, not retrying: {}", attempt, e);
                return Err(e);
            }
            Err(e) if attempt >= attempts => {
                warn!("Operation failed after {} attempts: {}", attempts, e);
                return Err(match e {
                    AppError::PersistenceUnavailable(msg) => AppError::persistence(format!(
                        "failed after {} attempts: {}",
                        attempts, msg
                    )),
                    other => other,
                });
            }
            Err(e) => {
                debug!("Attempt {} failed transiently, retrying in {:?}: {}", attempt, delay, e);
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(
                    Duration::from_millis((delay.as_millis() as f64 * config.backoff_multiplier) as u64),
                    config.max_delay,
                );
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast() -> RetryConfig {
        RetryConfig {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            ..RetryConfig::default()
        }
    }

    #[tokio::test]
    async fn test_retry_success_on_second_attempt() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result = retry_with_exponential_backoff(&fast(), || {
            let count_clone = attempt_count_clone.clone();
            async move {
                let count = count_clone.fetch_add(1, Ordering::SeqCst);
                if count == 0 {
                    Err(AppError::persistence("connection reset"))
                } else {
                    Ok("success")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(attempt_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_non_transient_error() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result: AppResult<&str> = retry_with_exponential_backoff(&fast(), || {
            let count_clone = attempt_count_clone.clone();
            async move {
                count_clone.fetch_add(1, Ordering::SeqCst);
                Err(AppError::not_found("event x"))
            }
        })
        .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result: AppResult<()> = retry_with_exponential_backoff(&fast(), || {
            let count_clone = attempt_count_clone.clone();
            async move {
                count_clone.fetch_add(1, Ordering::SeqCst);
                Err(AppError::persistence("database is locked"))
            }
        })
        .await;

        assert!(matches!(result, Err(AppError::PersistenceUnavailable(_))));
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
    }
}
