//! In-memory collaborators shared by the unit tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::db::{Item, KeyValueStore, Table};
use crate::error::AppError;
use crate::riot::{JsonFetcher, Query};

/// Answers from a fixed url -> payload table.
#[derive(Default)]
pub struct DummyFetcher {
    pub responses: HashMap<String, Value>,
    pub failing: HashSet<String>,
    pub delays: HashMap<String, Duration>,
    pub calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl DummyFetcher {
    pub fn with(mut self, url: impl Into<String>, payload: Value) -> Self {
        self.responses.insert(url.into(), payload);
        self
    }

    pub fn failing(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    pub fn delayed(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(url.into(), delay);
        self
    }

    pub fn called_urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }
}

#[async_trait]
impl JsonFetcher for DummyFetcher {
    async fn fetch(&self, url: &str, query: &Query<'_>) -> Result<Value, AppError> {
        self.calls.lock().unwrap().push((
            url.to_string(),
            query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(url) {
            return Err(AppError::from_status(503, url));
        }

        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::from_status(404, url))
    }
}

/// Store keeping rows in memory and recording every mutation.
#[derive(Default)]
pub struct MemoryStore {
    pub rows: Mutex<BTreeMap<(String, String), Item>>,
    pub puts: Mutex<Vec<Item>>,
    pub deletes: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn seeded(table: &Table, keys: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut rows = store.rows.lock().unwrap();
            for key in keys {
                let item = Item::from([(
                    table.key_attribute.clone(),
                    crate::db::AttributeValue::S(key.to_string()),
                )]);
                rows.insert((table.name.clone(), key.to_string()), item);
            }
        }
        store
    }

    pub fn keys(&self, table: &Table) -> Vec<String> {
        self.rows
            .lock()
            .unwrap()
            .keys()
            .filter(|(name, _)| name == &table.name)
            .map(|(_, key)| key.clone())
            .collect()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn scan(&self, table: &Table, column: &str) -> Result<Vec<String>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|((name, _), _)| name == &table.name)
            .filter_map(|(_, item)| item.get(column).and_then(|v| v.as_key()))
            .collect())
    }

    async fn put(&self, table: &Table, item: Item) -> Result<(), AppError> {
        let key = table.key_of(&item)?;
        self.puts.lock().unwrap().push(item.clone());
        self.rows
            .lock()
            .unwrap()
            .insert((table.name.clone(), key), item);
        Ok(())
    }

    async fn delete(&self, table: &Table, key: &str) -> Result<(), AppError> {
        self.deletes.lock().unwrap().push(key.to_string());
        self.rows
            .lock()
            .unwrap()
            .remove(&(table.name.clone(), key.to_string()));
        Ok(())
    }
}

/// Hands out a fixed key, or fails like a missing vault entry.
pub struct StaticSecret(pub Option<&'static str>);

#[async_trait]
impl crate::secrets::SecretProvider for StaticSecret {
    async fn api_key(&self) -> Result<String, AppError> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| AppError::Credential("no key".into()))
    }
}
