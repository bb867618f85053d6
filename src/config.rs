use std::env;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::riot::Platform;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub reconcile_region: Platform,
    pub reconcile_interval_secs: u64,
    pub leaderboard_table: String,
    pub fetch_concurrency: usize,
    pub fetch_batch_timeout: Option<Duration>,
    pub match_count: u32,
    pub riot_rate_limit_per_second: NonZeroU32,
    pub skip_empty_snapshot: bool,
    pub secret_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
        const DEFAULT_RECONCILE_REGION: &str = "euw1";
        const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 60;
        const DEFAULT_LEADERBOARD_TABLE: &str = "challenger_infos";
        const DEFAULT_FETCH_CONCURRENCY: usize = 4;
        const DEFAULT_MATCH_COUNT: u32 = 20;
        const DEFAULT_RIOT_RATE_LIMIT_PER_SECOND: u32 = 20;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:tft-ladder.db".into());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.into())
            .parse()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is not a socket address: {e}")))?;

        let reconcile_region = env::var("RECONCILE_REGION")
            .unwrap_or_else(|_| DEFAULT_RECONCILE_REGION.into())
            .parse()?;

        let reconcile_interval_secs = parse_var::<u64>("RECONCILE_INTERVAL_SECS")
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_RECONCILE_INTERVAL_SECS);

        let leaderboard_table =
            env::var("LEADERBOARD_TABLE").unwrap_or_else(|_| DEFAULT_LEADERBOARD_TABLE.into());

        let fetch_concurrency = parse_var::<usize>("FETCH_CONCURRENCY")
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_FETCH_CONCURRENCY);

        let fetch_batch_timeout = parse_var::<u64>("FETCH_BATCH_TIMEOUT_SECS").map(Duration::from_secs);

        let match_count = parse_var::<u32>("MATCH_COUNT").unwrap_or(DEFAULT_MATCH_COUNT);

        let riot_rate_limit_per_second = parse_var::<u32>("RIOT_RATE_LIMIT_PER_SECOND")
            .and_then(NonZeroU32::new)
            .unwrap_or_else(|| {
                NonZeroU32::new(DEFAULT_RIOT_RATE_LIMIT_PER_SECOND).unwrap_or(NonZeroU32::MIN)
            });

        let skip_empty_snapshot = parse_var::<bool>("RECONCILE_SKIP_EMPTY_SNAPSHOT").unwrap_or(false);

        let secret_file = env::var("RIOT_SECRET_FILE").ok().map(PathBuf::from);

        Ok(Self {
            database_url,
            bind_addr,
            reconcile_region,
            reconcile_interval_secs,
            leaderboard_table,
            fetch_concurrency,
            fetch_batch_timeout,
            match_count,
            riot_rate_limit_per_second,
            skip_empty_snapshot,
            secret_file,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
