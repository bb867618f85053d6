use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Rate limited or server error: {status} on {url}")]
    RateLimitOrServer { status: u16, url: String },

    #[error("Client request error: {status} on {url}")]
    ClientRequest { status: u16, url: String },

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Malformed JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unexpected payload: {0}")]
    UnexpectedPayload(String),

    #[error("Batch did not complete within {0:?}")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Connection level failure (TLS handshake, refused connection, dropped body).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// HTTP 429 or any 5xx.
    pub fn is_rate_limit_or_server(&self) -> bool {
        matches!(self, Self::RateLimitOrServer { .. })
    }

    /// Maps a non-success HTTP status to its error kind.
    pub fn from_status(status: u16, url: &str) -> Self {
        if status == 429 || (500..600).contains(&status) {
            Self::RateLimitOrServer {
                status,
                url: url.to_string(),
            }
        } else {
            Self::ClientRequest {
                status,
                url: url.to_string(),
            }
        }
    }

    /// Only connection level failures become [`AppError::Transport`]; timeouts,
    /// redirect loops and the like are final.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else if err.is_timeout() || err.is_redirect() {
            Self::Http(err)
        } else if err.is_connect() || err.is_request() || err.is_body() {
            Self::Transport(err)
        } else {
            Self::Http(err)
        }
    }
}
