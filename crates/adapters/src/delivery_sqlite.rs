//! SQLite delivery log implementation

use async_trait::async_trait;
use linkedin_connector_domain::{DeliveryLog, DeliveryLogError, DeliveryRecord};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;
use time::OffsetDateTime;
use uuid::Uuid;

/// SQLite-backed delivery log
pub struct SqliteDeliveryLog {
    pool: SqlitePool,
}

impl SqliteDeliveryLog {
    /// Create a new SQLite delivery log, initializing the database if needed
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self, DeliveryLogError> {
        let db_path = db_path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DeliveryLogError::Database(format!("Failed to create directory: {}", e))
            })?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| DeliveryLogError::Database(e.to_string()))?;

        let log = Self { pool };
        log.run_migrations().await?;

        Ok(log)
    }

    /// Create an in-memory SQLite log (for testing)
    pub async fn in_memory() -> Result<Self, DeliveryLogError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| DeliveryLogError::Database(e.to_string()))?;

        let log = Self { pool };
        log.run_migrations().await?;

        Ok(log)
    }

    async fn run_migrations(&self) -> Result<(), DeliveryLogError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS deliveries (
                id TEXT PRIMARY KEY,
                message_id TEXT NOT NULL UNIQUE,
                target_id INTEGER NOT NULL,
                post_id TEXT,
                published_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DeliveryLogError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_deliveries_target
            ON deliveries(target_id)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DeliveryLogError::Database(e.to_string()))?;

        Ok(())
    }

    /// Get the delivery recorded for a message id
    pub async fn get(&self, message_id: &str) -> Result<Option<DeliveryRecord>, DeliveryLogError> {
        let row: Option<(String, String, i64, Option<String>, String)> = sqlx::query_as(
            r#"
            SELECT id, message_id, target_id, post_id, published_at
            FROM deliveries
            WHERE message_id = ?
            "#,
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DeliveryLogError::Database(e.to_string()))?;

        match row {
            Some((id, message_id, target_id, post_id, published_at_str)) => {
                let id = Uuid::parse_str(&id)
                    .map_err(|e| DeliveryLogError::Serialization(e.to_string()))?;

                let published_at = OffsetDateTime::parse(
                    &published_at_str,
                    &time::format_description::well_known::Rfc3339,
                )
                .map_err(|e| DeliveryLogError::Serialization(e.to_string()))?;

                Ok(Some(DeliveryRecord {
                    id,
                    message_id,
                    target_id,
                    post_id,
                    published_at,
                }))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DeliveryLog for SqliteDeliveryLog {
    async fn is_delivered(&self, message_id: &str) -> Result<bool, DeliveryLogError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM deliveries WHERE message_id = ?")
            .bind(message_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DeliveryLogError::Database(e.to_string()))?;

        Ok(count.0 > 0)
    }

    async fn record(&self, record: &DeliveryRecord) -> Result<(), DeliveryLogError> {
        let published_at_str = record
            .published_at
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|e| DeliveryLogError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO deliveries (id, message_id, target_id, post_id, published_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(message_id) DO UPDATE SET
                post_id = COALESCE(excluded.post_id, deliveries.post_id)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.message_id)
        .bind(record.target_id)
        .bind(&record.post_id)
        .bind(&published_at_str)
        .execute(&self.pool)
        .await
        .map_err(|e| DeliveryLogError::Database(e.to_string()))?;

        Ok(())
    }
}
