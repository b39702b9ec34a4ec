use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rocket::tokio::sync::broadcast;
use rusqlite::{params, OptionalExtension};
use serde_json::{Map, Value};

use super::{check_path, merge_fields, new_key, split_path, ChangeFeed, Store, StoreError};
use crate::db::DbPool;

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(e: r2d2::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// SQLite-backed document store. Every record is one row of `nodes`,
/// holding its JSON body; `seq` preserves insertion order.
pub struct SqliteStore {
    pool: DbPool,
    feed: ChangeFeed,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            feed: ChangeFeed::default(),
        }
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StoreError> {
        Ok(self.pool.get()?)
    }
}

fn decode(path: &str, raw: &str) -> Result<Value, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

fn encode(value: &Value) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Backend(e.to_string()))
}

impl Store for SqliteStore {
    fn run_migrations(&self) -> Result<(), StoreError> {
        crate::db::run_migrations(&self.pool).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        check_path(path)?;
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row("SELECT value FROM nodes WHERE path = ?1", params![path], |row| row.get(0))
            .optional()?;
        raw.map(|r| decode(path, &r)).transpose()
    }

    fn children(&self, path: &str) -> Result<Vec<(String, Value)>, StoreError> {
        check_path(path)?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM nodes WHERE parent = ?1 ORDER BY seq ASC")?;
        let rows = stmt.query_map(params![path], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (key, raw) = row?;
            let value = decode(&format!("{}/{}", path, key), &raw)?;
            out.push((key, value));
        }
        Ok(out)
    }

    fn push(&self, path: &str, value: &Value) -> Result<String, StoreError> {
        check_path(path)?;
        let key = new_key();
        let full = format!("{}/{}", path, key);
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO nodes (path, parent, key, value, seq)
             VALUES (?1, ?2, ?3, ?4, (SELECT COALESCE(MAX(seq), 0) + 1 FROM nodes))",
            params![full, path, key, encode(value)?],
        )?;
        self.feed.notify(&full);
        Ok(key)
    }

    fn set(&self, path: &str, value: &Value) -> Result<(), StoreError> {
        check_path(path)?;
        let (parent, key) = split_path(path);
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO nodes (path, parent, key, value, seq)
             VALUES (?1, ?2, ?3, ?4, (SELECT COALESCE(MAX(seq), 0) + 1 FROM nodes))
             ON CONFLICT(path) DO UPDATE SET value = excluded.value",
            params![path, parent, key, encode(value)?],
        )?;
        self.feed.notify(path);
        Ok(())
    }

    fn update(&self, path: &str, fields: &Map<String, Value>) -> Result<(), StoreError> {
        check_path(path)?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let raw: Option<String> = tx
            .query_row("SELECT value FROM nodes WHERE path = ?1", params![path], |row| row.get(0))
            .optional()?;
        let current = match raw {
            Some(r) => decode(path, &r)?,
            None => return Err(StoreError::NotFound(path.to_string())),
        };
        let merged = merge_fields(path, current, fields)?;
        tx.execute(
            "UPDATE nodes SET value = ?1 WHERE path = ?2",
            params![encode(&merged)?, path],
        )?;
        tx.commit()?;
        self.feed.notify(path);
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<(), StoreError> {
        check_path(path)?;
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM nodes WHERE path = ?1 OR parent = ?1",
            params![path],
        )?;
        self.feed.notify(path);
        Ok(())
    }

    fn changes(&self) -> broadcast::Receiver<String> {
        self.feed.subscribe()
    }
}
