use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{Collection, Document, DocumentStore};

/// Postgres-backed document store. All collections share the `documents` table.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Helper struct for reading rows of the `documents` table.
#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    data: Value,
    time: Option<DateTime<Utc>>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            data: row.data,
            time: row.time.into(),
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn create(&self, collection: Collection, data: Value) -> AppResult<String> {
        let id = Uuid::new_v4().simple().to_string();

        sqlx::query(
            r#"
            INSERT INTO documents (id, collection, data, time)
            VALUES ($1, $2, $3, NOW())
            "#,
        )
        .bind(&id)
        .bind(collection.name())
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create {} document: {:?}", collection, e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(id)
    }

    async fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data, time
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.name())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch {} document: {:?}", collection, e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(row.map(Document::from))
    }

    async fn update(&self, collection: Collection, id: &str, data: Value) -> AppResult<bool> {
        let result = sqlx::query("UPDATE documents SET data = $1 WHERE collection = $2 AND id = $3")
            .bind(&data)
            .bind(collection.name())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update {} document: {:?}", collection, e);
                AppError::InternalServerError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: Collection, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.name())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete {} document: {:?}", collection, e);
                AppError::InternalServerError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, collection: Collection) -> AppResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data, time
            FROM documents
            WHERE collection = $1
            "#,
        )
        .bind(collection.name())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list {} documents: {:?}", collection, e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn clear(&self, collection: Collection) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1")
            .bind(collection.name())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to clear {} documents: {:?}", collection, e);
                AppError::InternalServerError(e.to_string())
            })?;

        Ok(result.rows_affected())
    }
}
