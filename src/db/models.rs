use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::AppError;
use crate::riot::LeaderboardEntry;

/// A stored row: attribute name to typed value.
pub type Item = BTreeMap<String, AttributeValue>;

/// Typed attribute format of the store.
///
/// Serialized as a single-key object tagged with the type, e.g.
/// `{"S": "abc"}`, `{"N": "42"}`, `{"BOOL": true}`. Numbers travel as their
/// decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    L(Vec<AttributeValue>),
    M(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    pub fn encode(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::S(s.clone()),
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::N(n.to_string()),
            Value::Null => Self::Null(true),
            Value::Array(values) => Self::L(values.iter().map(Self::encode).collect()),
            Value::Object(map) => Self::M(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::encode(v)))
                    .collect(),
            ),
        }
    }

    pub fn decode(&self) -> Result<Value, AppError> {
        Ok(match self {
            Self::S(s) => Value::String(s.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::N(n) => Value::Number(parse_number(n)?),
            Self::Null(_) => Value::Null,
            Self::L(values) => Value::Array(
                values
                    .iter()
                    .map(Self::decode)
                    .collect::<Result<_, _>>()?,
            ),
            Self::M(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| v.decode().map(|v| (k.clone(), v)))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    /// String form of a value usable as a row key.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Self::S(s) | Self::N(s) => Some(s.clone()),
            _ => None,
        }
    }
}

fn parse_number(raw: &str) -> Result<Number, AppError> {
    if let Ok(i) = raw.parse::<i64>() {
        return Ok(i.into());
    }
    if let Ok(u) = raw.parse::<u64>() {
        return Ok(u.into());
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| AppError::UnexpectedPayload(format!("`{raw}` is not a number")))
}

pub fn encode_item(object: &Map<String, Value>) -> Item {
    object
        .iter()
        .map(|(k, v)| (k.clone(), AttributeValue::encode(v)))
        .collect()
}

pub fn decode_item(item: &Item) -> Result<Map<String, Value>, AppError> {
    item.iter()
        .map(|(k, v)| v.decode().map(|v| (k.clone(), v)))
        .collect()
}

/// Persisted projection of a [`LeaderboardEntry`], keyed by `summonerId`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub summoner_id: String,
    pub item: Item,
}

impl StoredEntry {
    pub const KEY_ATTRIBUTE: &'static str = "summonerId";

    pub fn from_entry(entry: &LeaderboardEntry) -> Result<Self, AppError> {
        Ok(Self {
            summoner_id: entry.summoner_id.clone(),
            item: encode_item(&entry.to_json()?),
        })
    }

    pub fn to_entry(&self) -> Result<LeaderboardEntry, AppError> {
        let object = decode_item(&self.item)?;
        serde_json::from_value(Value::Object(object))
            .map_err(|e| AppError::UnexpectedPayload(e.to_string()))
    }
}
