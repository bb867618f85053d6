mod batch;
mod client;
mod endpoints;
mod metrics;
mod region;
mod retry;
mod types;

pub use batch::{BatchFetcher, DEFAULT_CONCURRENCY};
pub use client::{JsonFetcher, Query, RiotClient};
pub use endpoints::{Resource, resolve};
pub use metrics::{MetricsSnapshot, RequestMetrics};
pub use region::{Continent, Platform, classify_region};
pub use retry::{ErrorPredicate, RetryChain, RetryPolicy};
pub use types::{LeaderboardEntry, LeagueListDto, SummonerDto, from_payload};
