//! Persistent response cache backed by SQLite.
//!
//! Generation calls are slow and billed, so answers are stored under a key
//! derived from the operation, its arguments and the retrieval settings in
//! effect. Cache failures never fail the caller: they are logged and the
//! operation proceeds as a miss.

use crate::error::{GuaxinimError, Result};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

const KEY_PREFIX: &str = "guaxinim:";

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS responses (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
"#;

/// SQLite response cache with a time-to-live.
pub struct ResponseCache {
    conn: Mutex<Connection>,
    ttl: Duration,
}

impl ResponseCache {
    /// Open (or create) the cache database at `path`.
    #[instrument(skip_all)]
    pub fn open(path: &Path, ttl_days: u32) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Opened response cache at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
            ttl: Duration::days(i64::from(ttl_days)),
        })
    }

    /// In-memory cache (useful for testing).
    pub fn in_memory(ttl_days: u32) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            ttl: Duration::days(i64::from(ttl_days)),
        })
    }

    /// Canonical key for an operation and its arguments.
    ///
    /// Object keys are serialized in sorted order, so equal arguments always
    /// produce equal keys.
    pub fn key(operation: &str, args: &serde_json::Value) -> String {
        let key = serde_json::json!({ "operation": operation, "args": args });
        format!("{}{}", KEY_PREFIX, key)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| GuaxinimError::Cache(format!("Failed to acquire lock: {}", e)))
    }

    fn try_get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT value, created_at FROM responses WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((value, created_at)) = row else {
            return Ok(None);
        };

        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| GuaxinimError::Cache(format!("Bad timestamp: {}", e)))?
            .with_timezone(&Utc);

        if Utc::now() - created_at >= self.ttl {
            conn.execute("DELETE FROM responses WHERE key = ?1", params![key])?;
            debug!("Cache entry expired");
            return Ok(None);
        }

        Ok(Some(value))
    }

    fn try_put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO responses (key, value, created_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Look up a raw value. Errors are logged and treated as a miss.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Cache read error: {}", e);
                None
            }
        }
    }

    /// Store a raw value. Errors are logged and ignored.
    pub fn put(&self, key: &str, value: &str) {
        if let Err(e) = self.try_put(key, value) {
            warn!("Cache write error: {}", e);
        }
    }

    /// Look up and deserialize a value.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding unreadable cache entry: {}", e);
                None
            }
        }
    }

    /// Serialize and store a value.
    pub fn put_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.put(key, &raw),
            Err(e) => warn!("Cache write error: {}", e),
        }
    }

    /// Remove every entry. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM responses", [])?;
        info!("Cleared {} cached responses", removed);
        Ok(removed)
    }

    pub fn len(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
