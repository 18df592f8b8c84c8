use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::domain::identity::errors::StoreError;
use crate::domain::identity::models::SessionKey;
use crate::domain::identity::ports::SessionStore;

/// Session store on a single `session_entries` table.
///
/// `set` is an upsert so the last writer wins per key. Expired rows are
/// invisible to `get` and purged on the next write to the same key.
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete every expired entry. Safe to call at any time.
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM session_entries WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn set(&self, key: &SessionKey, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| StoreError::Backend(format!("TTL out of range: {}", e)))?;
        let expires_at = Utc::now() + ttl;

        sqlx::query(
            r#"
            INSERT INTO session_entries (key, value, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(key.to_string())
        .bind(value)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, key: &SessionKey) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT value
            FROM session_entries
            WHERE key = $1 AND expires_at > $2
            "#,
        )
        .bind(key.to_string())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(row.map(|(value,)| value))
    }

    async fn delete(&self, key: &SessionKey) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM session_entries WHERE key = $1")
            .bind(key.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }
}
