use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::error::AppError;
use crate::loader::DataLoader;

#[derive(Clone)]
pub struct AppState {
    loader: Arc<DataLoader>,
    match_count: u32,
}

impl AppState {
    pub fn new(loader: Arc<DataLoader>, match_count: u32) -> Self {
        Self {
            loader,
            match_count,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/{region}/challenger_names", get(challenger_names))
        .route("/{region}/matches_by_id/{user}", get(matches_by_id))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "🌐 HTTP server listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn challenger_names(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<HashMap<String, i64>>, AppError> {
    Ok(Json(state.loader.challenger_names(&region).await?))
}

async fn matches_by_id(
    State(state): State<AppState>,
    Path((region, user)): Path<(String, String)>,
) -> Result<Json<Vec<Value>>, AppError> {
    Ok(Json(
        state
            .loader
            .matches_for_player(&user, &region, state.match_count)
            .await?,
    ))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            AppError::Transport(_) => (StatusCode::BAD_GATEWAY, "TransportError"),
            AppError::Http(_) => (StatusCode::BAD_GATEWAY, "HttpError"),
            AppError::RateLimitOrServer { .. } => {
                (StatusCode::BAD_GATEWAY, "RateLimitOrServerError")
            }
            AppError::ClientRequest { .. } => (StatusCode::BAD_GATEWAY, "ClientRequestError"),
            AppError::Decode { .. } | AppError::UnexpectedPayload(_) => {
                (StatusCode::BAD_GATEWAY, "DecodeError")
            }
            AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "Timeout"),
            AppError::Credential(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CredentialError"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
        };

        error!(error = %self, status = status.as_u16(), "🌐 ❌ Request failed");

        (
            status,
            Json(json!({ "error": kind, "message": self.to_string() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::riot::{BatchFetcher, Resource, resolve};
    use crate::testing::{DummyFetcher, StaticSecret};

    fn state(fetcher: DummyFetcher, key: Option<&'static str>) -> AppState {
        let loader = DataLoader::new(
            BatchFetcher::new(Arc::new(fetcher), 4),
            Arc::new(StaticSecret(key)),
        );
        AppState::new(Arc::new(loader), 20)
    }

    #[tokio::test]
    async fn challenger_names_route_returns_mapping() {
        let fetcher = DummyFetcher::default().with(
            resolve(Resource::ChallengerList, "euw1"),
            json!({ "entries": [{ "summonerId": "1", "summonerName": "A", "leaguePoints": 10 }] }),
        );

        let Json(names) = challenger_names(State(state(fetcher, Some("k"))), Path("euw1".into()))
            .await
            .unwrap();

        assert_eq!(names.get("A"), Some(&10));
    }

    #[tokio::test]
    async fn failures_map_to_server_errors() {
        let err = challenger_names(
            State(state(DummyFetcher::default(), None)),
            Path("euw1".into()),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let upstream = AppError::from_status(503, "u").into_response();
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
        assert!(upstream.status().is_server_error());
    }

    #[tokio::test]
    async fn matches_route_returns_list() {
        let fetcher = DummyFetcher::default()
            .with(
                resolve(Resource::SummonerByName("ambatv"), "euw1"),
                json!({ "puuid": "p" }),
            )
            .with(resolve(Resource::MatchIdsByPuuid("p"), "euw1"), json!([]));
        let state = state(fetcher, Some("k"));

        let Json(matches) = matches_by_id(
            State(state),
            Path(("euw1".to_string(), "ambatv".to_string())),
        )
        .await
        .unwrap();

        assert!(matches.is_empty());
    }
}
