use rocket::tokio::sync::broadcast;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::Record;

pub mod live;
pub mod mongo;
pub mod sqlite;

pub use live::Subscription;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0}")]
    Backend(String),
    #[error("no record at {0}")]
    NotFound(String),
    #[error("malformed record at {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// Path-addressed realtime document store. Collections are paths whose
/// direct children are records (`designs/<key>`); singletons are plain
/// paths (`maintenance`).
/// Implementations: `SqliteStore` (rusqlite/r2d2) and `MongoStore` (mongodb).
pub trait Store: Send + Sync {
    // ── Lifecycle ───────────────────────────────────────────────────
    fn run_migrations(&self) -> Result<(), StoreError>;

    // ── Reads ───────────────────────────────────────────────────────
    fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;
    /// Direct children of `path`, in insertion order.
    fn children(&self, path: &str) -> Result<Vec<(String, Value)>, StoreError>;

    // ── Writes ──────────────────────────────────────────────────────
    /// Append under `path` with a generated key; returns the key.
    fn push(&self, path: &str, value: &Value) -> Result<String, StoreError>;
    /// Full overwrite, creating the node if needed.
    fn set(&self, path: &str, value: &Value) -> Result<(), StoreError>;
    /// Merge `fields` into the existing object at `path`.
    fn update(&self, path: &str, fields: &Map<String, Value>) -> Result<(), StoreError>;
    /// Delete the node and everything under it. Absent nodes are fine.
    fn remove(&self, path: &str) -> Result<(), StoreError>;

    // ── Change feed ─────────────────────────────────────────────────
    /// Receives the path of every write made after the call.
    fn changes(&self) -> broadcast::Receiver<String>;
}

/// Fan-out of changed paths, shared by the store implementations.
pub struct ChangeFeed {
    tx: broadcast::Sender<String>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        ChangeFeed { tx }
    }

    pub fn notify(&self, path: &str) {
        // No receivers is the normal idle state
        let _ = self.tx.send(path.to_string());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        ChangeFeed::new(256)
    }
}

/// Generated record key: millisecond time prefix so keys sort roughly by
/// creation, plus random suffix for uniqueness.
pub fn new_key() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0);
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{:011x}{}", millis, &suffix[..9])
}

/// `designs/abc` -> (`designs`, `abc`); `maintenance` -> (``, `maintenance`).
pub fn split_path(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some((parent, key)) => (parent, key),
        None => ("", path),
    }
}

pub fn child_path(collection: &str, key: &str) -> String {
    format!("{}/{}", collection, key)
}

/// Rejects empty segments and anything that could escape a collection.
pub fn check_path(path: &str) -> Result<(), StoreError> {
    let valid = !path.is_empty()
        && path
            .split('/')
            .all(|seg| !seg.is_empty() && !seg.contains(['$', '.']));
    if valid {
        Ok(())
    } else {
        Err(StoreError::NotFound(path.to_string()))
    }
}

/// Whether a write at `changed` alters what a subscriber of `subscribed` sees.
pub fn touches(subscribed: &str, changed: &str) -> bool {
    fn within(inner: &str, outer: &str) -> bool {
        inner == outer
            || (inner.len() > outer.len()
                && inner.starts_with(outer)
                && inner.as_bytes()[outer.len()] == b'/')
    }
    within(changed, subscribed) || within(subscribed, changed)
}

/// Merge top-level `fields` into an object value.
pub fn merge_fields(path: &str, current: Value, fields: &Map<String, Value>) -> Result<Value, StoreError> {
    match current {
        Value::Object(mut obj) => {
            for (k, v) in fields {
                obj.insert(k.clone(), v.clone());
            }
            Ok(Value::Object(obj))
        }
        _ => Err(StoreError::Decode {
            path: path.to_string(),
            reason: "partial update of a non-object value".to_string(),
        }),
    }
}

/// One-shot typed read of a collection. Records that do not decode are
/// skipped so a single bad record never blanks the page.
pub fn read_collection<T: DeserializeOwned>(
    store: &dyn Store,
    path: &str,
) -> Result<Vec<Record<T>>, StoreError> {
    let records = store
        .children(path)?
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<T>(value) {
            Ok(value) => Some(Record { key, value }),
            Err(e) => {
                log::warn!("Skipping malformed record {}/{}: {}", path, key, e);
                None
            }
        })
        .collect();
    Ok(records)
}

/// One-shot typed read of a single record; `None` when absent.
pub fn read_record<T: DeserializeOwned>(store: &dyn Store, path: &str) -> Result<Option<T>, StoreError> {
    match store.get(path)? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::Decode {
                path: path.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Singleton read where absence means the default value.
pub fn read_document<T: DeserializeOwned + Default>(store: &dyn Store, path: &str) -> Result<T, StoreError> {
    Ok(read_record(store, path)?.unwrap_or_default())
}
