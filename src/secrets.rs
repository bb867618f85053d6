//! Riot API key retrieval.

use std::env;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::AppError;

#[async_trait]
pub trait SecretProvider: Send + Sync {
    async fn api_key(&self) -> Result<String, AppError>;
}

/// Reads the key from an environment variable at call time.
#[derive(Debug, Clone)]
pub struct EnvSecretProvider {
    var: String,
}

impl EnvSecretProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::new("RIOT_API_KEY")
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn api_key(&self) -> Result<String, AppError> {
        match env::var(&self.var) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(AppError::Credential(format!("{} is not set", self.var))),
        }
    }
}

/// Reads the key out of a JSON secret document such as `{"KEY_RIOT": "RGAPI-..."}`.
#[derive(Debug, Clone)]
pub struct JsonFileSecretProvider {
    path: PathBuf,
}

impl JsonFileSecretProvider {
    const KEY_FIELD: &'static str = "KEY_RIOT";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SecretProvider for JsonFileSecretProvider {
    async fn api_key(&self) -> Result<String, AppError> {
        debug!(path = %self.path.display(), "🔑 reading secret document");

        let raw = tokio::fs::read(&self.path).await.map_err(|e| {
            AppError::Credential(format!("cannot read {}: {e}", self.path.display()))
        })?;

        let document: Value = serde_json::from_slice(&raw).map_err(|e| {
            AppError::Credential(format!("{} is not JSON: {e}", self.path.display()))
        })?;

        document
            .get(Self::KEY_FIELD)
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Credential(format!(
                    "{} has no `{}` string field",
                    self.path.display(),
                    Self::KEY_FIELD
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("tft-ladder-{}-{name}.json", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn env_provider_reads_variable() {
        // SAFETY: the variable name is unique to this test.
        unsafe { env::set_var("TFT_LADDER_TEST_KEY", "RGAPI-test") };
        let provider = EnvSecretProvider::new("TFT_LADDER_TEST_KEY");

        assert_eq!(provider.api_key().await.unwrap(), "RGAPI-test");
    }

    #[tokio::test]
    async fn env_provider_missing_variable_is_a_credential_error() {
        let provider = EnvSecretProvider::new("TFT_LADDER_SURELY_UNSET");

        assert!(matches!(
            provider.api_key().await,
            Err(AppError::Credential(_))
        ));
    }

    #[tokio::test]
    async fn file_provider_extracts_field() {
        let path = secret_file("ok", r#"{"KEY_RIOT": "RGAPI-file", "other": 1}"#);

        let key = JsonFileSecretProvider::new(&path).api_key().await.unwrap();

        assert_eq!(key, "RGAPI-file");
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn file_provider_errors_are_credential_errors() {
        let missing_field = secret_file("nofield", r#"{"other": "x"}"#);
        let not_json = secret_file("notjson", "KEY_RIOT=abc");

        for path in [&missing_field, &not_json] {
            assert!(matches!(
                JsonFileSecretProvider::new(path).api_key().await,
                Err(AppError::Credential(_))
            ));
            let _ = std::fs::remove_file(path);
        }

        assert!(matches!(
            JsonFileSecretProvider::new("/nonexistent/secret.json")
                .api_key()
                .await,
            Err(AppError::Credential(_))
        ));
    }
}
