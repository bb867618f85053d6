use std::sync::Arc;

use tft_ladder::{
    config::Config,
    db::{SqliteStore, Table},
    error::AppError,
    loader::DataLoader,
    logging,
    poller::{self, LeaderboardReconciler},
    riot::{BatchFetcher, JsonFetcher, RequestMetrics, RiotClient},
    secrets::{EnvSecretProvider, JsonFileSecretProvider, SecretProvider},
    server::{self, AppState},
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    logging::init();
    let config = Config::from_env()?;

    info!("🐙 Starting...");

    let metrics = RequestMetrics::new("riot");
    tokio::spawn(metrics.clone().log_loop());

    let client: Arc<dyn JsonFetcher> = Arc::new(RiotClient::new(
        config.riot_rate_limit_per_second,
        metrics.clone(),
    ));

    let secrets: Arc<dyn SecretProvider> = match &config.secret_file {
        Some(path) => Arc::new(JsonFileSecretProvider::new(path)),
        None => Arc::new(EnvSecretProvider::default()),
    };

    let store = Arc::new(SqliteStore::connect(&config.database_url).await?);

    let reconciler = LeaderboardReconciler::new(
        client.clone(),
        store,
        secrets.clone(),
        Table::leaderboard(config.leaderboard_table.clone()),
        metrics,
    )
    .skip_empty_snapshot(config.skip_empty_snapshot);

    tokio::spawn(poller::start_polling(
        Arc::new(reconciler),
        config.reconcile_region,
        config.reconcile_interval_secs,
    ));

    let batch = BatchFetcher::new(client, config.fetch_concurrency)
        .with_timeout(config.fetch_batch_timeout);
    let loader = DataLoader::new(batch, secrets);

    server::serve(config.bind_addr, AppState::new(Arc::new(loader), config.match_count)).await
}
