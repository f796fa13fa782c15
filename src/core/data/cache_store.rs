//! SQLite cache of looked-up records
//!
//! Entries are keyed by `(source, word)` with the word stored exactly as the
//! caller typed it. Writes are whole-row upserts committed before `put`
//! returns, so a crash right after a lookup keeps the cached result and never
//! damages earlier rows.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

use crate::core::record::Record;
use crate::error::CacheError;

const CURRENT_DB_VERSION: u32 = 1;

pub struct CacheStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl CacheStore {
    /// Open the store at `db_path`, creating the directory, file and schema
    /// when they are missing.
    pub fn open(db_path: &Path) -> Result<Self, CacheError> {
        info!("Opening cache database at: {}", db_path.display());

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(CacheError::Directory)?;
            }
        }

        let conn = Connection::open(db_path).map_err(|source| CacheError::Open {
            path: db_path.to_path_buf(),
            source,
        })?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "FULL")?;

        Self::prepare(conn, Some(db_path.to_path_buf()))
    }

    /// In-memory store, same schema as the file-backed one
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        Self::prepare(conn, None)
    }

    fn prepare(mut conn: Connection, path: Option<PathBuf>) -> Result<Self, CacheError> {
        let existing_user_version: u32 =
            conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if existing_user_version < CURRENT_DB_VERSION {
            Self::upgrade_database(&mut conn, existing_user_version)?;
        } else if existing_user_version > CURRENT_DB_VERSION {
            return Err(CacheError::Migration(format!(
                "database version {} is newer than supported version {}",
                existing_user_version, CURRENT_DB_VERSION
            )));
        }

        Ok(CacheStore { conn, path })
    }

    fn upgrade_database(conn: &mut Connection, existing_version: u32) -> Result<(), CacheError> {
        debug!(
            "Upgrading cache database from version {} to {}",
            existing_version, CURRENT_DB_VERSION
        );

        if existing_version == 0 {
            let tx = conn.transaction()?;

            tx.pragma_update(None, "user_version", CURRENT_DB_VERSION)?;

            tx.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS records (
                    source TEXT NOT NULL,
                    word TEXT NOT NULL,
                    content TEXT NOT NULL,
                    updated_at INTEGER NOT NULL,
                    PRIMARY KEY (source, word)
                );
            "#,
            )?;

            tx.commit()?;
        }

        Ok(())
    }

    pub fn exists(&self, source: &str, word: &str) -> Result<bool, CacheError> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM records WHERE source = ?1 AND word = ?2",
                params![source, word],
                |_| Ok(()),
            )
            .optional()?;

        Ok(found.is_some())
    }

    pub fn get(&self, source: &str, word: &str) -> Result<Record, CacheError> {
        let content: Option<String> = self
            .conn
            .query_row(
                "SELECT content FROM records WHERE source = ?1 AND word = ?2",
                params![source, word],
                |row| row.get(0),
            )
            .optional()?;

        match content {
            Some(content) => Record::from_stored(word, &content, source),
            None => Err(CacheError::NotFound {
                source_name: source.to_string(),
                word: word.to_string(),
            }),
        }
    }

    pub fn put(&mut self, record: &Record) -> Result<(), CacheError> {
        let content = record.content_text()?;

        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO records (source, word, content, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (source, word) DO UPDATE SET
                content = excluded.content,
                updated_at = excluded.updated_at
            "#,
            params![record.source(), record.word(), content, current_timestamp()],
        )?;
        tx.commit()?;

        debug!("Cached {} entry for: {}", record.source(), record.word());
        Ok(())
    }

    pub fn count(&self) -> Result<u64, CacheError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn write_raw(&self, source: &str, word: &str, content: &str) -> Result<(), CacheError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO records (source, word, content, updated_at) VALUES (?1, ?2, ?3, 0)",
            params![source, word, content],
        )?;
        Ok(())
    }
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(word: &str, source: &str, definition: &str) -> Record {
        Record::new(word, json!({ "definition": definition }), source).unwrap()
    }

    #[test]
    fn test_put_then_get_round_trips() {
        let mut store = CacheStore::open_in_memory().unwrap();
        let hello = record("hello", "urban", "a greeting");

        assert!(!store.exists("urban", "hello").unwrap());
        store.put(&hello).unwrap();

        assert!(store.exists("urban", "hello").unwrap());
        assert_eq!(store.get("urban", "hello").unwrap(), hello);
    }

    #[test]
    fn test_put_twice_is_idempotent() {
        let mut store = CacheStore::open_in_memory().unwrap();
        let hello = record("hello", "urban", "a greeting");

        store.put(&hello).unwrap();
        store.put(&hello).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get("urban", "hello").unwrap(), hello);
    }

    #[test]
    fn test_put_overwrites_existing_entry() {
        let mut store = CacheStore::open_in_memory().unwrap();
        store.put(&record("hello", "urban", "old")).unwrap();
        store.put(&record("hello", "urban", "new")).unwrap();

        let stored = store.get("urban", "hello").unwrap();
        assert_eq!(stored.content()["definition"], "new");
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_key_includes_source_and_literal_word() {
        let mut store = CacheStore::open_in_memory().unwrap();
        store.put(&record("Hello", "urban", "capitalized")).unwrap();

        assert!(store.exists("urban", "Hello").unwrap());
        assert!(!store.exists("urban", "hello").unwrap());
        assert!(!store.exists("yahoo", "Hello").unwrap());
    }

    #[test]
    fn test_get_missing_entry_is_not_found() {
        let store = CacheStore::open_in_memory().unwrap();
        let err = store.get("urban", "missing").unwrap_err();
        assert!(matches!(err, CacheError::NotFound { .. }));
    }

    #[test]
    fn test_get_corrupt_entry_is_reported() {
        let store = CacheStore::open_in_memory().unwrap();
        store.write_raw("urban", "broken", "{oops").unwrap();

        assert!(store.exists("urban", "broken").unwrap());
        assert!(matches!(
            store.get("urban", "broken").unwrap_err(),
            CacheError::Corrupt { .. }
        ));
    }

    #[test]
    fn test_open_creates_file_and_reopens_existing() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("lexget.db");
        let hello = record("hello", "yahoo", "ni hao");

        {
            let mut store = CacheStore::open(&db_path).unwrap();
            store.put(&hello).unwrap();
        }
        assert!(db_path.exists());

        let store = CacheStore::open(&db_path).unwrap();
        assert_eq!(store.path(), Some(db_path.as_path()));
        assert_eq!(store.get("yahoo", "hello").unwrap(), hello);
    }
}
