//! Retry policies applied around a single logical request.
//!
//! A [`RetryChain`] holds an ordered list of [`RetryPolicy`]. When the wrapped
//! operation fails, the first policy whose predicate accepts the error decides
//! whether to sleep and try again. Each policy keeps its own attempt budget for
//! the whole call; an error no policy accepts, or one whose policy is out of
//! attempts, is returned to the caller unchanged.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use super::metrics::RequestMetrics;
use crate::error::AppError;

pub type ErrorPredicate = fn(&AppError) -> bool;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub name: &'static str,
    /// Total calls allowed to fail with a matching error, first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
    /// Upper bound of the random delay added to each backoff step.
    pub max_jitter: Duration,
    pub max_delay: Duration,
    pub retry_on: ErrorPredicate,
}

impl RetryPolicy {
    /// TLS and connection failures: many quick attempts.
    pub fn transport() -> Self {
        Self {
            name: "transport",
            max_attempts: 64,
            base_delay: Duration::from_millis(250),
            multiplier: 2.0,
            max_jitter: Duration::from_secs(1),
            max_delay: Duration::from_secs(16),
            retry_on: AppError::is_transport,
        }
    }

    /// HTTP 429 and 5xx: few attempts with long backoff.
    pub fn rate_limit_or_server() -> Self {
        Self {
            name: "rate_limit_or_server",
            max_attempts: 8,
            base_delay: Duration::from_secs(5),
            multiplier: 2.0,
            max_jitter: Duration::ZERO,
            max_delay: Duration::from_secs(320),
            retry_on: AppError::is_rate_limit_or_server,
        }
    }

    pub fn matches(&self, err: &AppError) -> bool {
        (self.retry_on)(err)
    }

    /// Delay before the `retry`-th retry (0-based), without jitter.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());

        if capped.is_finite() && capped >= 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            self.max_delay
        }
    }

    fn delay(&self, retry: u32) -> Duration {
        let max_jitter_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter = if max_jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::rng().random_range(0..=max_jitter_ms))
        };

        (self.backoff(retry) + jitter).min(self.max_delay)
    }
}

#[derive(Debug, Clone)]
pub struct RetryChain {
    policies: Vec<RetryPolicy>,
}

impl Default for RetryChain {
    fn default() -> Self {
        Self::new(vec![
            RetryPolicy::transport(),
            RetryPolicy::rate_limit_or_server(),
        ])
    }
}

impl RetryChain {
    pub fn new(policies: Vec<RetryPolicy>) -> Self {
        Self { policies }
    }

    /// A chain that never retries.
    pub fn none() -> Self {
        Self::new(Vec::new())
    }

    pub async fn run<T, F, Fut>(&self, metrics: &RequestMetrics, mut op: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let mut retries = vec![0u32; self.policies.len()];

        loop {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let Some((idx, policy)) = self
                .policies
                .iter()
                .enumerate()
                .find(|(_, policy)| policy.matches(&err))
            else {
                debug!(error = %err, "🔁 error is not retryable");
                return Err(err);
            };

            if retries[idx] + 1 >= policy.max_attempts {
                warn!(
                    policy = policy.name,
                    attempts = policy.max_attempts,
                    error = %err,
                    "🔁 ❌ retry budget exhausted"
                );
                return Err(err);
            }

            let delay = policy.delay(retries[idx]);
            retries[idx] += 1;
            metrics.inc_retries();

            warn!(
                policy = policy.name,
                retry = retries[idx],
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "🔁 request failed, retrying"
            );

            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn server_error() -> AppError {
        AppError::from_status(503, "http://test")
    }

    #[test]
    fn backoff_grows_and_caps() {
        let policy = RetryPolicy::rate_limit_or_server();
        assert_eq!(policy.backoff(0), Duration::from_secs(5));
        assert_eq!(policy.backoff(1), Duration::from_secs(10));
        assert_eq!(policy.backoff(5), Duration::from_secs(160));
        assert_eq!(policy.backoff(6), Duration::from_secs(320));
        assert_eq!(policy.backoff(7), Duration::from_secs(320));

        let transport = RetryPolicy::transport();
        assert_eq!(transport.backoff(0), Duration::from_millis(250));
        assert_eq!(transport.backoff(63), Duration::from_secs(16));
    }

    #[test]
    fn jittered_delay_stays_within_cap() {
        let policy = RetryPolicy::transport();
        for retry in 0..64 {
            let delay = policy.delay(retry);
            assert!(delay >= policy.backoff(retry).min(policy.max_delay));
            assert!(delay <= policy.max_delay);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_server_errors() {
        let metrics = RequestMetrics::new("test");
        let calls = &AtomicU32::new(0);

        let res = RetryChain::default()
            .run(&metrics, || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(server_error())
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(res.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(metrics.snapshot().retries, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn server_tier_gives_up_after_eight_attempts() {
        let metrics = RequestMetrics::new("test");
        let calls = &AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let res: Result<(), _> = RetryChain::default()
            .run(&metrics, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(server_error())
            })
            .await;

        assert!(matches!(
            res,
            Err(AppError::RateLimitOrServer { status: 503, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 8);
        // 5 + 10 + 20 + 40 + 80 + 160 + 320
        assert_eq!(started.elapsed(), Duration::from_secs(635));
    }

    #[tokio::test(start_paused = true)]
    async fn client_errors_are_not_retried() {
        let metrics = RequestMetrics::new("test");
        let calls = &AtomicU32::new(0);

        let res: Result<(), _> = RetryChain::default()
            .run(&metrics, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::from_status(404, "http://test"))
            })
            .await;

        assert!(matches!(res, Err(AppError::ClientRequest { status: 404, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.snapshot().retries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn policies_keep_separate_budgets() {
        fn is_timeout(err: &AppError) -> bool {
            matches!(err, AppError::Timeout(_))
        }

        fn quick(name: &'static str, max_attempts: u32, retry_on: ErrorPredicate) -> RetryPolicy {
            RetryPolicy {
                name,
                max_attempts,
                base_delay: Duration::from_millis(10),
                multiplier: 1.0,
                max_jitter: Duration::ZERO,
                max_delay: Duration::from_millis(10),
                retry_on,
            }
        }
        let chain = RetryChain::new(vec![
            quick("timeouts", 3, is_timeout),
            quick("server", 2, AppError::is_rate_limit_or_server),
        ]);

        let metrics = RequestMetrics::new("test");
        let calls = &AtomicU32::new(0);

        // timeout, server, timeout, server -> second server failure exhausts its budget
        let res: Result<(), _> = chain
            .run(&metrics, || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n % 2 == 0 {
                    Err(AppError::Timeout(Duration::ZERO))
                } else {
                    Err(server_error())
                }
            })
            .await;

        assert!(matches!(res, Err(AppError::RateLimitOrServer { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn empty_chain_returns_first_error() {
        let metrics = RequestMetrics::new("test");
        let res: Result<(), _> = RetryChain::none()
            .run(&metrics, || async { Err(server_error()) })
            .await;

        assert!(res.unwrap_err().is_rate_limit_or_server());
    }
}
