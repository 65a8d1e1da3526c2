//! Generic key-value store over `storefront.kv_store`.
//!
//! Values are JSONB documents. The store offers single and batch get/set/delete
//! plus a prefix scan, and typed wrappers that (de)serialize with serde. There
//! are no cross-key transactions: read-modify-write callers accept last-writer
//! wins.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::RepositoryError;

/// Repository for the namespaced JSON key-value table.
pub struct KvStore<'a> {
    pool: &'a PgPool,
}

impl<'a> KvStore<'a> {
    /// Create a new KV store handle.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, key: &str) -> Result<Option<JsonValue>, RepositoryError> {
        let value = sqlx::query_scalar::<_, JsonValue>(
            r"
            SELECT value FROM storefront.kv_store
            WHERE key = $1
            ",
        )
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        Ok(value)
    }

    /// Insert or replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set(&self, key: &str, value: &JsonValue) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.kv_store (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            ",
        )
        .bind(key)
        .bind(value)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete the value stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn del(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM storefront.kv_store WHERE key = $1")
            .bind(key)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Get several keys at once. Missing keys are omitted from the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mget(&self, keys: &[String]) -> Result<Vec<(String, JsonValue)>, RepositoryError> {
        let rows = sqlx::query_as::<_, (String, JsonValue)>(
            r"
            SELECT key, value FROM storefront.kv_store
            WHERE key = ANY($1)
            ORDER BY key
            ",
        )
        .bind(keys)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Insert or replace several entries in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any write fails; nothing is
    /// written in that case.
    pub async fn mset(&self, entries: &[(String, JsonValue)]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for (key, value) in entries {
            sqlx::query(
                r"
                INSERT INTO storefront.kv_store (key, value)
                VALUES ($1, $2)
                ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
                ",
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Write `entries` only if no key starts with `prefix` yet.
    ///
    /// The check and the writes run in one transaction holding an advisory
    /// lock on `prefix`, so concurrent callers write the set at most once.
    /// Returns whether the entries were written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// written in that case.
    pub async fn mset_if_prefix_empty(
        &self,
        prefix: &str,
        entries: &[(String, JsonValue)],
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(prefix)
            .execute(&mut *tx)
            .await?;

        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM storefront.kv_store WHERE key LIKE $1 ESCAPE '\'
            )
            ",
        )
        .bind(like_prefix_pattern(prefix))
        .fetch_one(&mut *tx)
        .await?;

        if exists {
            return Ok(false);
        }

        for (key, value) in entries {
            sqlx::query(
                r"
                INSERT INTO storefront.kv_store (key, value)
                VALUES ($1, $2)
                ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
                ",
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Delete several keys at once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mdel(&self, keys: &[String]) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM storefront.kv_store WHERE key = ANY($1)")
            .bind(keys)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Every entry whose key starts with `prefix`, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, JsonValue)>, RepositoryError> {
        let rows = sqlx::query_as::<_, (String, JsonValue)>(
            r"
            SELECT key, value FROM storefront.kv_store
            WHERE key LIKE $1 ESCAPE '\'
            ORDER BY key
            ",
        )
        .bind(like_prefix_pattern(prefix))
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    // Typed helpers
    // =========================================================================

    /// Get and deserialize the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored document does
    /// not match `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, RepositoryError> {
        self.get(key)
            .await?
            .map(|value| decode(key, value))
            .transpose()
    }

    /// Serialize and store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Serialization` if `value` cannot be encoded.
    pub async fn set_json<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), RepositoryError> {
        let value = serde_json::to_value(value)?;
        self.set(key, &value).await
    }

    /// Deserialize every document under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` on the first document that
    /// does not match `T`.
    pub async fn get_by_prefix_json<T: DeserializeOwned>(
        &self,
        prefix: &str,
    ) -> Result<Vec<T>, RepositoryError> {
        self.get_by_prefix(prefix)
            .await?
            .into_iter()
            .map(|(key, value)| decode(&key, value))
            .collect()
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: JsonValue) -> Result<T, RepositoryError> {
    serde_json::from_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid document at '{key}': {e}")))
}

/// Build a `LIKE` pattern matching keys that start with `prefix` literally.
fn like_prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
