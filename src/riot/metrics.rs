use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use tracing::info;

const SUMMARY_PERIOD: Duration = Duration::from_secs(60);

/// Counters shared by the fetchers and the reconciler.
///
/// One instance is built at startup and handed to each component's
/// constructor.
#[derive(Debug)]
pub struct RequestMetrics {
    start: Instant,
    name: &'static str,
    requests: AtomicU64,
    retries: AtomicU64,
    failures: AtomicU64,
    deletes: AtomicU64,
    writes: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub retries: u64,
    pub failures: u64,
    pub deletes: u64,
    pub writes: u64,
}

impl RequestMetrics {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            start: Instant::now(),
            name,
            requests: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        })
    }

    pub fn inc_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_retries(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_deletes(&self, n: u64) {
        self.deletes.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_writes(&self, n: u64) {
        self.writes.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }

    /// Average request rate since construction.
    pub fn requests_per_minute(&self) -> f64 {
        let minutes = self.start.elapsed().as_secs_f64() / 60.0;
        if minutes > 0.0 {
            self.requests.load(Ordering::Relaxed) as f64 / minutes
        } else {
            0.0
        }
    }

    /// Logs a counter summary every minute. Never returns.
    pub async fn log_loop(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(SUMMARY_PERIOD);
        // first tick is immediate, nothing to report yet
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let counters = self.snapshot();
            info!(
                client = self.name,
                requests = counters.requests,
                retries = counters.retries,
                failures = counters.failures,
                deletes = counters.deletes,
                writes = counters.writes,
                per_minute = self.requests_per_minute(),
                "📊 Request summary"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = RequestMetrics::new("test");
        metrics.inc_requests();
        metrics.inc_requests();
        metrics.inc_retries();
        metrics.add_deletes(3);
        metrics.add_writes(5);

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                requests: 2,
                retries: 1,
                failures: 0,
                deletes: 3,
                writes: 5,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn rate_is_averaged_over_elapsed_minutes() {
        let metrics = RequestMetrics::new("test");
        assert_eq!(metrics.requests_per_minute(), 0.0);

        for _ in 0..10 {
            metrics.inc_requests();
        }
        tokio::time::advance(Duration::from_secs(120)).await;

        assert_eq!(metrics.requests_per_minute(), 5.0);
    }
}
