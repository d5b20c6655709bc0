use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppResult;
use crate::store::{Collection, Document, DocumentStore, Timestamp};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// In-memory document store for development and tests.
#[derive(Clone)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<Document>>>>,
    clock: Clock,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Uses `clock` for every write timestamp.
    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            clock: Arc::new(clock),
        }
    }

    /// Inserts a document with an explicit timestamp, bypassing the clock.
    pub async fn seed(&self, collection: Collection, data: Value, time: Timestamp) -> String {
        let id = new_id();
        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().push(Document {
            id: id.clone(),
            data,
            time,
        });
        id
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: Collection, data: Value) -> AppResult<String> {
        let time = Timestamp::Committed((self.clock)());
        Ok(self.seed(collection, data, time).await)
    }

    async fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn update(&self, collection: Collection, id: &str, data: Value) -> AppResult<bool> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id));
        match doc {
            Some(doc) => {
                doc.data = data;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: Collection, id: &str) -> AppResult<bool> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|doc| doc.id != id);
        Ok(docs.len() != before)
    }

    async fn list(&self, collection: Collection) -> AppResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn clear(&self, collection: Collection) -> AppResult<u64> {
        let mut collections = self.collections.write().await;
        let removed = collections
            .remove(&collection)
            .map(|docs| docs.len())
            .unwrap_or(0);
        Ok(removed as u64)
    }
}
