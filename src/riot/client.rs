use std::{num::NonZeroU32, sync::Arc};

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde_json::Value;
use tracing::{instrument, trace};

use super::metrics::RequestMetrics;
use super::retry::RetryChain;
use crate::error::AppError;

/// Query string pairs attached to a request.
pub type Query<'a> = [(&'a str, &'a str)];

/// A single logical GET returning decoded JSON.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn fetch(&self, url: &str, query: &Query<'_>) -> Result<Value, AppError>;
}

/// HTTP client for the Riot API.
///
/// Every attempt waits on the client-side rate limiter, then the whole call is
/// driven by the [`RetryChain`]. Successful bodies are returned as decoded JSON
/// without any schema check.
pub struct RiotClient {
    client: reqwest::Client,
    limiter: DefaultDirectRateLimiter,
    retry: RetryChain,
    metrics: Arc<RequestMetrics>,
}

impl RiotClient {
    pub fn new(rate_limit_per_second: NonZeroU32, metrics: Arc<RequestMetrics>) -> Self {
        Self {
            client: reqwest::Client::new(),
            limiter: RateLimiter::direct(Quota::per_second(rate_limit_per_second)),
            retry: RetryChain::default(),
            metrics,
        }
    }

    pub fn with_retry(mut self, retry: RetryChain) -> Self {
        self.retry = retry;
        self
    }

    pub fn metrics(&self) -> &Arc<RequestMetrics> {
        &self.metrics
    }

    async fn get_once(&self, url: &str, query: &Query<'_>) -> Result<Value, AppError> {
        self.limiter.until_ready().await;
        self.metrics.inc_requests();
        trace!("[RIOT::CLIENT] GET {}", url);

        let res = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(AppError::from_reqwest)?;

        let status = res.status();
        if !status.is_success() {
            return Err(AppError::from_status(status.as_u16(), url));
        }

        let body = res.bytes().await.map_err(AppError::from_reqwest)?;
        serde_json::from_slice(&body).map_err(|source| AppError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl JsonFetcher for RiotClient {
    #[instrument(skip(self, query))]
    async fn fetch(&self, url: &str, query: &Query<'_>) -> Result<Value, AppError> {
        let res = self.retry.run(&self.metrics, || self.get_once(url, query)).await;

        if res.is_err() {
            self.metrics.inc_failures();
        }

        res
    }
}
