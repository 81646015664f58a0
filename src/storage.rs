// 🗄️ Storage Port - durable key-value records
//
// The menu store never touches a database directly. It talks to a
// KeyValueStore: get/set serialized JSON by fixed key.
//
// Adapters:
// - MemoryStore: in-process map (tests, demos)
// - SqliteStore: rusqlite + WAL, one row per key

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, RwLock};

use crate::error::MenuError;

// ============================================================================
// PORT
// ============================================================================

/// Key-value persistence used by the record store.
///
/// Values are serialized records (JSON text). Implementations must be safe to
/// share between threads since the API server holds one store for all requests.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`, or None if never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Write several keys as one unit.
    ///
    /// The default applies the writes in order and stops at the first
    /// failure, so earlier keys stay written. Adapters that can commit
    /// atomically override it.
    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

// ============================================================================
// IN-MEMORY ADAPTER
// ============================================================================

/// In-process store backed by a HashMap
///
/// `fail_writes_to` makes every write touching a key fail, which lets tests
/// exercise the storage-failure paths (quota exceeded and similar).
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
    failing_keys: RwLock<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a write fault for `key`
    pub fn fail_writes_to(&self, key: &str) {
        self.failing_keys.write().unwrap().insert(key.to_string());
    }

    /// Clear every injected fault
    pub fn heal(&self) {
        self.failing_keys.write().unwrap().clear();
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.values.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self, key: &str) -> Result<()> {
        if self.failing_keys.read().unwrap().contains(key) {
            return Err(MenuError::Storage(format!("write rejected for key '{}'", key)).into());
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable(key)?;
        self.values
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        // Validate everything before touching the map: all or nothing
        for (key, _) in entries {
            self.check_writable(key)?;
        }

        let mut values = self.values.write().unwrap();
        for (key, value) in entries {
            values.insert(key.to_string(), value.clone());
        }
        Ok(())
    }
}

// ============================================================================
// SQLITE ADAPTER
// ============================================================================

/// Durable store: a single `kv_store` table in SQLite (WAL mode)
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        Self::from_connection(conn)
    }

    /// In-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_kv_table(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Keys currently stored, sorted
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

pub fn setup_kv_table(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery (no-op for in-memory databases)
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read key '{}'", key))?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        upsert(&conn, key, value).with_context(|| format!("Failed to write key '{}'", key))?;
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for (key, value) in entries {
            upsert(&tx, key, value).with_context(|| format!("Failed to write key '{}'", key))?;
        }
        tx.commit().context("Failed to commit batch write")?;
        Ok(())
    }
}

fn upsert(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, Utc::now().to_rfc3339()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("a", "[1,2]").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("[1,2]".to_string()));

        store.set("a", "[3]").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("[3]".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_store_set_many_is_all_or_nothing() {
        let store = MemoryStore::new();
        store.set("first", "old").unwrap();
        store.fail_writes_to("second");

        let result = store.set_many(&[("first", "new".to_string()), ("second", "x".to_string())]);
        assert!(result.is_err());

        // Nothing from the failed batch was applied
        assert_eq!(store.get("first").unwrap(), Some("old".to_string()));
        assert_eq!(store.get("second").unwrap(), None);

        store.heal();
        store
            .set_many(&[("first", "new".to_string()), ("second", "x".to_string())])
            .unwrap();
        assert_eq!(store.get("first").unwrap(), Some("new".to_string()));
        assert_eq!(store.get("second").unwrap(), Some("x".to_string()));
    }

    #[test]
    fn test_injected_failure_is_storage_error() {
        let store = MemoryStore::new();
        store.fail_writes_to("k");

        let err = store.set("k", "v").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MenuError>(),
            Some(MenuError::Storage(_))
        ));
    }

    #[test]
    fn test_sqlite_store_get_set() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("menu_items").unwrap(), None);

        store.set("menu_items", "[]").unwrap();
        store.set("menu_items", "[{}]").unwrap();
        assert_eq!(store.get("menu_items").unwrap(), Some("[{}]".to_string()));
        assert_eq!(store.keys().unwrap(), vec!["menu_items".to_string()]);
    }

    #[test]
    fn test_sqlite_store_set_many() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .set_many(&[("b", "2".to_string()), ("a", "1".to_string())])
            .unwrap();

        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));
        assert_eq!(store.get("b").unwrap(), Some("2".to_string()));
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("menu_price_history", "[]").unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("menu_price_history").unwrap(),
            Some("[]".to_string())
        );
    }
}
