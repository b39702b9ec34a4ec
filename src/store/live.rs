use std::sync::Arc;

use rocket::tokio::sync::broadcast::{self, error::RecvError};
use rocket::tokio::task;
use serde::de::DeserializeOwned;

use super::{read_collection, read_document, touches, Store, StoreError};
use crate::models::Record;

type Loader<T> = fn(&dyn Store, &str) -> Result<T, StoreError>;

/// Long-lived registration on one path. Yields the current snapshot first,
/// then a fresh full snapshot after every write touching the path. Each
/// snapshot supersedes the previous one.
pub struct Subscription<T> {
    store: Arc<dyn Store>,
    path: String,
    feed: broadcast::Receiver<String>,
    load: Loader<T>,
    stale: bool,
}

impl<T> Subscription<T> {
    pub fn new(store: Arc<dyn Store>, path: impl Into<String>, load: Loader<T>) -> Self {
        // Subscribe before the first read so no write slips between them
        let feed = store.changes();
        Subscription {
            store,
            path: path.into(),
            feed,
            load,
            stale: true,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<T: Send + 'static> Subscription<T> {
    /// `None` once the store's feed is gone.
    ///
    /// Cancel-safe: a snapshot dropped mid-read is read again on the next call.
    pub async fn next(&mut self) -> Option<Result<T, StoreError>> {
        while !self.stale {
            match self.feed.recv().await {
                Ok(changed) if touches(&self.path, &changed) => self.stale = true,
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    log::debug!("Subscription {} lagged by {} changes, re-reading", self.path, skipped);
                    self.stale = true;
                }
                Err(RecvError::Closed) => return None,
            }
        }
        let snapshot = self.snapshot().await;
        self.stale = false;
        Some(snapshot)
    }

    /// Store reads block, so they run on the blocking pool.
    async fn snapshot(&self) -> Result<T, StoreError> {
        let store = self.store.clone();
        let path = self.path.clone();
        let load = self.load;
        task::spawn_blocking(move || load(&*store, &path))
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
    }
}

impl<T: DeserializeOwned> Subscription<Vec<Record<T>>> {
    pub fn collection(store: Arc<dyn Store>, path: &str) -> Self {
        Subscription::new(store, path, read_collection::<T>)
    }
}

impl<T: DeserializeOwned + Default> Subscription<T> {
    pub fn document(store: Arc<dyn Store>, path: &str) -> Self {
        Subscription::new(store, path, read_document::<T>)
    }
}
