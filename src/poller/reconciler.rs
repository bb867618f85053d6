use std::collections::HashSet;
use std::sync::Arc;

use tracing::{Span, debug, field, info, instrument, warn};

use crate::db::{KeyValueStore, StoredEntry, Table};
use crate::error::AppError;
use crate::riot::{
    JsonFetcher, LeaderboardEntry, LeagueListDto, RequestMetrics, Resource, from_payload, resolve,
};
use crate::secrets::SecretProvider;

/// Changes needed to align the store with a remote snapshot.
///
/// The remote side is authoritative: every remote entry is rewritten, and
/// every stored key missing from the snapshot is deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilePlan {
    pub deletes: Vec<String>,
    pub upserts: Vec<LeaderboardEntry>,
}

impl ReconcilePlan {
    pub fn compute(stored_keys: HashSet<String>, remote: Vec<LeaderboardEntry>) -> Self {
        let remote_keys: HashSet<&str> = remote.iter().map(|e| e.summoner_id.as_str()).collect();

        let mut deletes: Vec<String> = stored_keys
            .into_iter()
            .filter(|key| !remote_keys.contains(key.as_str()))
            .collect();
        deletes.sort();

        Self {
            deletes,
            upserts: remote,
        }
    }

    /// An empty snapshot over a non-empty store: applying it empties the table.
    pub fn wipes_store(&self) -> bool {
        self.upserts.is_empty() && !self.deletes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub deleted: usize,
    pub written: usize,
    pub skipped: bool,
}

/// Keeps a store table in line with the remote challenger leaderboard.
pub struct LeaderboardReconciler {
    fetcher: Arc<dyn JsonFetcher>,
    store: Arc<dyn KeyValueStore>,
    secrets: Arc<dyn SecretProvider>,
    table: Table,
    metrics: Arc<RequestMetrics>,
    skip_empty_snapshot: bool,
}

impl LeaderboardReconciler {
    pub fn new(
        fetcher: Arc<dyn JsonFetcher>,
        store: Arc<dyn KeyValueStore>,
        secrets: Arc<dyn SecretProvider>,
        table: Table,
        metrics: Arc<RequestMetrics>,
    ) -> Self {
        Self {
            fetcher,
            store,
            secrets,
            table,
            metrics,
            skip_empty_snapshot: false,
        }
    }

    /// Turns a run over an empty remote snapshot into a no-op instead of a wipe.
    pub fn skip_empty_snapshot(mut self, skip: bool) -> Self {
        self.skip_empty_snapshot = skip;
        self
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    #[instrument(skip(self), fields(table = %self.table.name, remote = field::Empty, stored = field::Empty))]
    pub async fn reconcile(&self, region: &str) -> Result<ReconcileReport, AppError> {
        let key = self.secrets.api_key().await?;

        let url = resolve(Resource::ChallengerList, region);
        let payload = self.fetcher.fetch(&url, &[("api_key", key.as_str())]).await?;
        let snapshot: LeagueListDto = from_payload(payload)?;

        let stored_keys: HashSet<String> = self
            .store
            .scan(&self.table, &self.table.key_attribute)
            .await?
            .into_iter()
            .collect();

        Span::current().record("remote", snapshot.entries.len());
        Span::current().record("stored", stored_keys.len());

        let plan = ReconcilePlan::compute(stored_keys, snapshot.entries);

        if plan.wipes_store() {
            if self.skip_empty_snapshot {
                warn!(
                    stored = plan.deletes.len(),
                    "🧹 ⚠️ Remote snapshot is empty, leaving stored entries untouched"
                );
                return Ok(ReconcileReport {
                    skipped: true,
                    ..Default::default()
                });
            }
            warn!(
                stored = plan.deletes.len(),
                "🧹 ⚠️ Remote snapshot is empty, every stored entry will be deleted"
            );
        }

        self.apply(&plan).await
    }

    async fn apply(&self, plan: &ReconcilePlan) -> Result<ReconcileReport, AppError> {
        let mut report = ReconcileReport::default();

        if !plan.deletes.is_empty() {
            info!(count = plan.deletes.len(), "🧹 Deleting stale entries");
        }
        for key in &plan.deletes {
            self.store.delete(&self.table, key).await?;
            self.metrics.add_deletes(1);
            report.deleted += 1;
        }

        for entry in &plan.upserts {
            let stored = StoredEntry::from_entry(entry)?;
            self.store.put(&self.table, stored.item).await?;
            self.metrics.add_writes(1);
            report.written += 1;
        }

        debug!(
            deleted = report.deleted,
            written = report.written,
            "🧹 ✅ Leaderboard reconciled"
        );

        Ok(report)
    }
}
