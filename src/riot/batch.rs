use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, TryStreamExt, stream};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::client::{JsonFetcher, Query};
use crate::error::AppError;

/// Reference worker budget.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Runs many independent fetches with a bounded number in flight.
///
/// Results come back in completion order. The batch is all or nothing: the
/// first fetch that fails after exhausting its retries fails the whole call
/// and the remaining in-flight fetches are dropped.
pub struct BatchFetcher {
    fetcher: Arc<dyn JsonFetcher>,
    concurrency: usize,
    timeout: Option<Duration>,
}

impl BatchFetcher {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
            timeout: None,
        }
    }

    /// Bounds the wall-clock time of a whole batch.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn fetcher(&self) -> &Arc<dyn JsonFetcher> {
        &self.fetcher
    }

    #[instrument(skip_all, fields(count = urls.len(), concurrency = self.concurrency))]
    pub async fn fetch_many(
        &self,
        urls: Vec<String>,
        query: &Query<'_>,
    ) -> Result<Vec<Value>, AppError> {
        let fetcher = &self.fetcher;

        let work = stream::iter(urls)
            .map(|url| async move { fetcher.fetch(&url, query).await })
            .buffer_unordered(self.concurrency)
            .try_collect::<Vec<_>>();

        let res = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .map_err(|_| AppError::Timeout(limit))?,
            None => work.await,
        };

        match &res {
            Ok(values) => debug!(fetched = values.len(), "📦 batch completed"),
            Err(e) => warn!(error = %e, "📦 ❌ batch failed"),
        }

        res
    }
}
