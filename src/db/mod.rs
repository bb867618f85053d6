mod migrations;
mod models;
mod repository;

use async_trait::async_trait;

pub use migrations::run_migrations;
pub use models::{AttributeValue, Item, StoredEntry, decode_item, encode_item};
pub use repository::SqliteStore;

use crate::error::AppError;

/// A store table and the attribute its rows are keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub key_attribute: String,
}

impl Table {
    pub fn new(name: impl Into<String>, key_attribute: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_attribute: key_attribute.into(),
        }
    }

    /// Table holding the leaderboard projection.
    pub fn leaderboard(name: impl Into<String>) -> Self {
        Self::new(name, StoredEntry::KEY_ATTRIBUTE)
    }

    pub fn key_of(&self, item: &Item) -> Result<String, AppError> {
        item.get(&self.key_attribute)
            .and_then(AttributeValue::as_key)
            .ok_or_else(|| {
                AppError::UnexpectedPayload(format!(
                    "item for `{}` has no `{}` key",
                    self.name, self.key_attribute
                ))
            })
    }
}

/// Minimal key-value store contract.
///
/// No transactions: each call stands alone and the last write to a key wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Every value of `column` across all rows of `table`.
    async fn scan(&self, table: &Table, column: &str) -> Result<Vec<String>, AppError>;

    /// Inserts or overwrites the row keyed by the table's key attribute.
    async fn put(&self, table: &Table, item: Item) -> Result<(), AppError>;

    async fn delete(&self, table: &Table, key: &str) -> Result<(), AppError>;
}
