use std::str::FromStr;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::debug;

use super::migrations::run_migrations;
use super::models::Item;
use super::{KeyValueStore, Table};
use crate::error::AppError;

/// [`KeyValueStore`] on top of SQLite.
///
/// Rows of every logical table live in `kv_items`, the item itself stored as
/// the JSON of its typed attributes.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `url` and applies the schema.
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    #[cfg(test)]
    pub async fn get(&self, table: &Table, key: &str) -> Result<Option<Item>, AppError> {
        let raw = sqlx::query_scalar::<_, String>(
            "SELECT item FROM kv_items WHERE table_name = ? AND item_key = ?",
        )
        .bind(&table.name)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        raw.as_deref().map(parse_item).transpose()
    }

    #[cfg(test)]
    pub async fn count(&self, table: &Table) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM kv_items WHERE table_name = ?")
                .bind(&table.name)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

fn parse_item(raw: &str) -> Result<Item, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::UnexpectedPayload(format!("corrupted stored item: {e}")))
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn scan(&self, table: &Table, column: &str) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query_scalar::<_, String>("SELECT item FROM kv_items WHERE table_name = ?")
            .bind(&table.name)
            .fetch_all(&self.pool)
            .await?;

        let mut values = Vec::with_capacity(rows.len());
        for raw in rows {
            if let Some(value) = parse_item(&raw)?.get(column).and_then(|v| v.as_key()) {
                values.push(value);
            }
        }

        debug!(table = %table.name, column, count = values.len(), "🗄️ scanned");
        Ok(values)
    }

    async fn put(&self, table: &Table, item: Item) -> Result<(), AppError> {
        let key = table.key_of(&item)?;
        let raw = serde_json::to_string(&item)
            .map_err(|e| AppError::UnexpectedPayload(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO kv_items (table_name, item_key, item)
            VALUES (?, ?, ?)
            ON CONFLICT(table_name, item_key) DO UPDATE SET
                item = excluded.item,
                updated_at = unixepoch()
            "#,
        )
        .bind(&table.name)
        .bind(key)
        .bind(raw)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, table: &Table, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM kv_items WHERE table_name = ? AND item_key = ?")
            .bind(&table.name)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
