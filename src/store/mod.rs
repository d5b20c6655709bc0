// src/store/mod.rs

//! Generic document store.
//!
//! Every collection holds schemaless JSON documents. The store assigns the
//! document id and the write timestamp; a timestamp that has not been
//! committed yet reads back as [`Timestamp::Pending`].

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{AppError, AppResult};

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// Named collections used by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Students,
    Tests,
    Results,
    BrainBucks,
    Teachers,
    Subjects,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Students => "students",
            Collection::Tests => "tests",
            Collection::Results => "results",
            Collection::BrainBucks => "brainBucks",
            Collection::Teachers => "teachers",
            Collection::Subjects => "subjects",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Store-assigned write time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Timestamp {
    /// Not committed yet, or not readable as an instant.
    #[default]
    Pending,
    Committed(DateTime<Utc>),
}

impl Timestamp {
    pub fn now() -> Self {
        Timestamp::Committed(Utc::now())
    }

    /// Milliseconds since the Unix epoch; `Pending` sorts first as 0.
    pub fn millis(&self) -> i64 {
        match self {
            Timestamp::Pending => 0,
            Timestamp::Committed(at) => at.timestamp_millis(),
        }
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Pending => None,
            Timestamp::Committed(at) => Some(*at),
        }
    }

    /// ISO-8601 with millisecond precision, e.g. `2024-05-01T08:00:00.000Z`.
    pub fn to_iso(&self) -> Option<String> {
        self.instant()
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Interprets a raw JSON value. Anything unreadable becomes `Pending`.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|at| Timestamp::Committed(at.with_timezone(&Utc)))
                .unwrap_or(Timestamp::Pending),
            Value::Number(n) => n
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .map(Timestamp::Committed)
                .unwrap_or(Timestamp::Pending),
            _ => Timestamp::Pending,
        }
    }
}

impl From<Option<DateTime<Utc>>> for Timestamp {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map(Timestamp::Committed).unwrap_or(Timestamp::Pending)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_iso() {
            Some(iso) => serializer.serialize_str(&iso),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .map(Timestamp::from_value)
            .unwrap_or(Timestamp::Pending))
    }
}

/// A stored document as returned by the store.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub data: Value,
    pub time: Timestamp,
}

impl Document {
    /// Decodes the document into a typed record.
    ///
    /// `id` and `time` are merged into the data object so typed records can
    /// declare them as ordinary fields.
    pub fn decode<T: DeserializeOwned>(&self) -> AppResult<T> {
        let mut data = match &self.data {
            Value::Object(map) => map.clone(),
            other => {
                return Err(AppError::InternalServerError(format!(
                    "Document {} is not an object: {}",
                    self.id, other
                )));
            }
        };
        data.insert("id".to_string(), Value::String(self.id.clone()));
        data.insert("time".to_string(), serde_json::to_value(self.time)?);

        serde_json::from_value(Value::Object(data)).map_err(|e| {
            AppError::InternalServerError(format!("Failed to decode document {}: {}", self.id, e))
        })
    }
}

/// Authenticated document-store client contract.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a document and returns its store-assigned id.
    async fn create(&self, collection: Collection, data: Value) -> AppResult<String>;

    async fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Document>>;

    /// Replaces the document data, keeping id and write time.
    /// Returns false when the document does not exist.
    async fn update(&self, collection: Collection, id: &str, data: Value) -> AppResult<bool>;

    /// Returns false when the document does not exist.
    async fn delete(&self, collection: Collection, id: &str) -> AppResult<bool>;

    /// All documents of a collection, in no particular order.
    async fn list(&self, collection: Collection) -> AppResult<Vec<Document>>;

    /// Deletes every document of a collection and returns how many were removed.
    async fn clear(&self, collection: Collection) -> AppResult<u64>;
}

/// Serializes a record without the fields owned by the store.
pub fn to_document_data<T: Serialize>(record: &T) -> AppResult<Value> {
    let mut value = serde_json::to_value(record)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    if let Value::Object(map) = &mut value {
        map.remove("id");
        map.remove("time");
    }
    Ok(value)
}

pub async fn insert<T: Serialize>(
    store: &dyn DocumentStore,
    collection: Collection,
    record: &T,
) -> AppResult<String> {
    let data = to_document_data(record)?;
    store.create(collection, data).await
}

pub async fn fetch<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
) -> AppResult<Option<T>> {
    match store.get(collection, id).await? {
        Some(doc) => doc.decode().map(Some),
        None => Ok(None),
    }
}

/// Decodes every document of a collection, skipping malformed ones.
pub async fn fetch_all<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
) -> AppResult<Vec<T>> {
    let docs = store.list(collection).await?;
    let mut records = Vec::with_capacity(docs.len());
    for doc in docs {
        match doc.decode() {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("Skipping malformed {} document: {}", collection, e),
        }
    }
    Ok(records)
}
