//! Read path: player matches and challenger standings.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::AppError;
use crate::riot::{
    BatchFetcher, JsonFetcher, LeagueListDto, Resource, SummonerDto, from_payload, resolve,
};
use crate::secrets::SecretProvider;

pub const DEFAULT_MATCH_COUNT: u32 = 20;

pub struct DataLoader {
    fetcher: Arc<dyn JsonFetcher>,
    batch: BatchFetcher,
    secrets: Arc<dyn SecretProvider>,
}

impl DataLoader {
    pub fn new(batch: BatchFetcher, secrets: Arc<dyn SecretProvider>) -> Self {
        Self {
            fetcher: batch.fetcher().clone(),
            batch,
            secrets,
        }
    }

    /// Up to `count` most recent match payloads of a summoner, in no particular order.
    #[instrument(skip(self))]
    pub async fn matches_for_player(
        &self,
        name: &str,
        region: &str,
        count: u32,
    ) -> Result<Vec<Value>, AppError> {
        let key = self.secrets.api_key().await?;
        let auth = [("api_key", key.as_str())];

        let summoner_url = resolve(Resource::SummonerByName(name), region);
        let summoner: SummonerDto = from_payload(self.fetcher.fetch(&summoner_url, &auth).await?)?;

        let count = count.to_string();
        let ids_url = resolve(Resource::MatchIdsByPuuid(&summoner.puuid), region);
        let match_ids: Vec<String> = from_payload(
            self.fetcher
                .fetch(&ids_url, &[("api_key", key.as_str()), ("count", count.as_str())])
                .await?,
        )?;

        debug!(matches = match_ids.len(), "🎮 Resolved match ids");

        let urls = match_ids
            .iter()
            .map(|id| resolve(Resource::MatchById(id), region))
            .collect();

        self.batch.fetch_many(urls, &auth).await
    }

    /// Summoner name to league points for the challenger tier of `region`.
    ///
    /// When two entries share a name the later one wins. An entry without a
    /// name or league points fails the call.
    #[instrument(skip(self))]
    pub async fn challenger_names(&self, region: &str) -> Result<HashMap<String, i64>, AppError> {
        let key = self.secrets.api_key().await?;

        let url = resolve(Resource::ChallengerList, region);
        let list: LeagueListDto =
            from_payload(self.fetcher.fetch(&url, &[("api_key", key.as_str())]).await?)?;

        list.entries
            .into_iter()
            .try_fold(HashMap::new(), |mut names, entry| {
                let (Some(name), Some(points)) = (entry.summoner_name, entry.league_points) else {
                    return Err(AppError::UnexpectedPayload(format!(
                        "challenger entry `{}` has no name or league points",
                        entry.summoner_id
                    )));
                };
                names.insert(name, points);
                Ok(names)
            })
    }
}
