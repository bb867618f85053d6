use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

// ============================================================================
// Summoner-v1
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerDto {
    pub puuid: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

// ============================================================================
// League-v1
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueListDto {
    pub entries: Vec<LeaderboardEntry>,
}

/// One row of a league snapshot.
///
/// Only `summonerId` is required: league entries no longer always carry the
/// summoner name. Fields the crate does not read are kept in `extra` so that
/// the stored projection carries the whole remote entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub summoner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summoner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league_points: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LeaderboardEntry {
    /// The entry as a JSON object, every field included.
    pub fn to_json(&self) -> Result<Map<String, Value>, AppError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(AppError::UnexpectedPayload(format!(
                "leaderboard entry serialized to {other}"
            ))),
            Err(e) => Err(AppError::UnexpectedPayload(e.to_string())),
        }
    }
}

/// Projects an already decoded payload into a typed view.
pub fn from_payload<T: serde::de::DeserializeOwned>(payload: Value) -> Result<T, AppError> {
    serde_json::from_value(payload).map_err(|e| AppError::UnexpectedPayload(e.to_string()))
}
