//! SQLite-backed override store.
//!
//! One row per component uuid holding a JSON object (`value_json`), an enabled flag and the UNIX
//! time of the last write. Only enabled rows are applied during a registry build; disabled rows
//! stay around so they can be re-enabled.
//!
//! The store degrades instead of failing: when the database cannot be opened every read yields
//! "no override" and only writes report [`StoreError::Unavailable`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::errors::StoreError;

/// Result type for store writes.
pub type StoreResult<T> = Result<T, StoreError>;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS custom (
    comp_uuid TEXT NOT NULL PRIMARY KEY,
    value_json TEXT NOT NULL,
    enabled INTEGER NOT NULL DEFAULT 1,
    updated_at INTEGER NOT NULL
)
"#;

const CREATE_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_custom_enabled ON custom(enabled)";

/// A stored override, enabled or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverrideEntry {
    /// Component uuid.
    pub uuid: String,
    /// The stored JSON text, exactly as written.
    pub raw_payload: String,
    /// Whether the override is applied at build time.
    pub enabled: bool,
    /// Time of the last write.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

impl OverrideEntry {
    /// Parses the stored payload, if it is a JSON object.
    pub fn payload(&self) -> Option<Map<String, Value>> {
        match serde_json::from_str(&self.raw_payload) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

/// Listing form of an [`OverrideEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverrideSummary {
    /// Component uuid.
    pub uuid: String,
    /// Whether the override is applied at build time.
    pub enabled: bool,
    /// Time of the last write.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

/// Handle to the override database.
#[derive(Debug, Clone)]
pub struct OverrideStore {
    path: PathBuf,
    pool: Option<SqlitePool>,
}

impl OverrideStore {
    /// Opens the store at `path`, creating the parent directory, the database file, the table
    /// and its index as needed.
    ///
    /// Never fails; check [`OverrideStore::is_ready`] to see whether the database is usable.
    pub async fn ensure(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        match Self::open(&path).await {
            Ok(pool) => {
                tracing::debug!(path = %path.display(), "override store ready");
                Self {
                    path,
                    pool: Some(pool),
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "override store unavailable");
                Self { path, pool: None }
            }
        }
    }

    /// A store that is never ready; every read yields "no override".
    pub fn unavailable(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool: None,
        }
    }

    async fn open(path: &Path) -> StoreResult<SqlitePool> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        sqlx::query(CREATE_INDEX).execute(&pool).await?;
        Ok(pool)
    }

    /// Whether the database was opened successfully.
    pub fn is_ready(&self) -> bool {
        self.pool.is_some()
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn pool(&self) -> StoreResult<&SqlitePool> {
        self.pool.as_ref().ok_or(StoreError::Unavailable)
    }

    /// Returns the enabled override for `uuid`, or an empty object.
    ///
    /// Missing rows, disabled rows, database errors and payloads that are not JSON objects all
    /// yield `{}`; the latter two are logged at debug level.
    pub async fn get_override(&self, uuid: &str) -> Map<String, Value> {
        let Some(pool) = self.pool.as_ref() else {
            return Map::new();
        };
        let row: Option<(String,)> = match sqlx::query_as(
            "SELECT value_json FROM custom WHERE comp_uuid = ? AND enabled = 1 LIMIT 1",
        )
        .bind(uuid)
        .fetch_optional(pool)
        .await
        {
            Ok(row) => row,
            Err(err) => {
                tracing::debug!(uuid, error = %err, "override read failed");
                return Map::new();
            }
        };
        let Some((text,)) = row else {
            return Map::new();
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                tracing::debug!(uuid, "stored override must be a JSON object; ignored");
                Map::new()
            }
            Err(err) => {
                tracing::debug!(uuid, error = %err, "stored override is not valid JSON; ignored");
                Map::new()
            }
        }
    }

    /// Returns the row for `uuid` whether or not it is enabled.
    pub async fn get_entry(&self, uuid: &str) -> Option<OverrideEntry> {
        let pool = self.pool.as_ref()?;
        let row: Option<(String, String, i64, i64)> = match sqlx::query_as(
            "SELECT comp_uuid, value_json, enabled, updated_at FROM custom WHERE comp_uuid = ? LIMIT 1",
        )
        .bind(uuid)
        .fetch_optional(pool)
        .await
        {
            Ok(row) => row,
            Err(err) => {
                tracing::debug!(uuid, error = %err, "override entry read failed");
                return None;
            }
        };
        row.map(|(uuid, raw_payload, enabled, updated_at)| OverrideEntry {
            uuid,
            raw_payload,
            enabled: enabled != 0,
            updated_at: timestamp(updated_at),
        })
    }

    /// Lists every stored override ordered by uuid.
    pub async fn list_entries(&self) -> Vec<OverrideSummary> {
        let Some(pool) = self.pool.as_ref() else {
            return Vec::new();
        };
        let rows: Vec<(String, i64, i64)> = match sqlx::query_as(
            "SELECT comp_uuid, enabled, updated_at FROM custom ORDER BY comp_uuid ASC",
        )
        .fetch_all(pool)
        .await
        {
            Ok(rows) => rows,
            Err(err) => {
                tracing::debug!(error = %err, "override listing failed");
                return Vec::new();
            }
        };
        rows.into_iter()
            .map(|(uuid, enabled, updated_at)| OverrideSummary {
                uuid,
                enabled: enabled != 0,
                updated_at: timestamp(updated_at),
            })
            .collect()
    }

    /// Inserts or replaces the override for `uuid`.
    ///
    /// The payload is stored as compact JSON with sorted keys so equal payloads produce equal
    /// text. Last writer wins.
    pub async fn upsert(
        &self,
        uuid: &str,
        payload: &Map<String, Value>,
        enabled: bool,
    ) -> StoreResult<()> {
        let pool = self.pool()?;
        let text = serde_json::to_string(payload)?;
        sqlx::query(
            r#"
            INSERT INTO custom(comp_uuid, value_json, enabled, updated_at)
            VALUES(?, ?, ?, ?)
            ON CONFLICT(comp_uuid) DO UPDATE SET
                value_json = excluded.value_json,
                enabled = excluded.enabled,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(uuid)
        .bind(&text)
        .bind(i64::from(enabled))
        .bind(Utc::now().timestamp())
        .execute(pool)
        .await?;
        tracing::info!(uuid, enabled, "override saved");
        Ok(())
    }

    /// Flips the enabled flag of an existing override, leaving its payload untouched.
    ///
    /// Returns `false` when no row exists for `uuid`.
    pub async fn set_enabled(&self, uuid: &str, enabled: bool) -> StoreResult<bool> {
        let pool = self.pool()?;
        let result =
            sqlx::query("UPDATE custom SET enabled = ?, updated_at = ? WHERE comp_uuid = ?")
                .bind(i64::from(enabled))
                .bind(Utc::now().timestamp())
                .bind(uuid)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
