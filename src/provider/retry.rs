use std::future::Future;

use rand::Rng;
use tokio::time::{sleep, Duration};

use crate::error::{EngineError, Result};
use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::metrics::CycleMetrics;

#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 3, base_delay_ms: 200, max_delay_ms: 5000, jitter_factor: 0.3 }
    }
}

impl RetryConfig {
    pub fn from_config(cfg: &crate::config::Config) -> Self {
        Self {
            max_retries: cfg.retry_max,
            base_delay_ms: cfg.retry_base_delay_ms,
            ..Default::default()
        }
    }

    /// Exponential backoff with jitter.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.base_delay_ms as f64 * 2.0_f64.powi(attempt as i32);
        let clamped = base.min(self.max_delay_ms as f64);
        let jitter_range = clamped * self.jitter_factor;
        let jitter: f64 = if jitter_range > 0.0 {
            rand::thread_rng().gen_range(-jitter_range..=jitter_range)
        } else {
            0.0
        };
        Duration::from_millis((clamped + jitter).max(0.0) as u64)
    }
}

/// Retry a provider call on transient failure. Non-transient errors
/// (assignment exhaustion, conflicts) pass straight through. Each
/// performed retry bumps `provider_retries` on the cycle counters.
pub async fn retry_provider<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    metrics: Option<&CycleMetrics>,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error: Option<EngineError> = None;

    for attempt in 0..=config.max_retries {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() => {
                if attempt < config.max_retries {
                    if let Some(m) = metrics {
                        CycleMetrics::bump(&m.provider_retries);
                    }
                    let delay = config.delay_for_attempt(attempt);
                    log(
                        Level::Warn,
                        Domain::Provider,
                        "retry",
                        obj(&[
                            ("op", v_str(operation_name)),
                            ("attempt", v_num(attempt + 1)),
                            ("max", v_num(config.max_retries + 1)),
                            ("error", v_str(&e.to_string())),
                            ("delay_ms", v_num(delay.as_millis() as u32)),
                        ]),
                    );
                    sleep(delay).await;
                }
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error
        .unwrap_or_else(|| EngineError::ProviderUnavailable("retry exhausted".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn delay_doubles_then_clamps() {
        let config = RetryConfig {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 1000,
            jitter_factor: 0.0,
        };
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(4), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn transient_errors_retry_until_success() {
        let config = RetryConfig { max_retries: 3, base_delay_ms: 1, ..Default::default() };
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        let metrics = CycleMetrics::new();

        let result: Result<u32> = retry_provider(&config, "test", Some(&metrics), || {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(EngineError::ProviderUnavailable("flaky".to_string()))
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        // two failed attempts, each followed by a retry
        assert_eq!(metrics.provider_retries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_transient_errors_fail_fast() {
        let config = RetryConfig { max_retries: 3, base_delay_ms: 1, ..Default::default() };
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        let metrics = CycleMetrics::new();

        let result: Result<u32> = retry_provider(&config, "test", Some(&metrics), || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(EngineError::Conflict("guard".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(EngineError::Conflict(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.provider_retries.load(Ordering::SeqCst), 0);
    }
}
