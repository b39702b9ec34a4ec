use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{ClientOptions, FindOneAndUpdateOptions, FindOptions, ReturnDocument, UpdateOptions};
use mongodb::sync::{Client, Collection, Database};
use mongodb::IndexModel;
use rocket::tokio::sync::broadcast;
use serde_json::{Map, Value};

use super::{check_path, new_key, split_path, ChangeFeed, Store, StoreError};

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// MongoDB-backed document store. Records live in one `nodes` collection
/// keyed by their full path.
pub struct MongoStore {
    db: Database,
    feed: ChangeFeed,
}

impl MongoStore {
    /// Create a new MongoStore by connecting to the given URI and database name.
    pub fn new(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let client_options = ClientOptions::parse(uri)?;
        let client = Client::with_options(client_options)?;
        Ok(Self {
            db: client.database(db_name),
            feed: ChangeFeed::default(),
        })
    }

    /// Test connectivity by pinging the server.
    pub fn test_connection(&self) -> Result<(), StoreError> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .map_err(|e| StoreError::Backend(format!("MongoDB connection test failed: {}", e)))?;
        Ok(())
    }

    fn nodes(&self) -> Collection<Document> {
        self.db.collection::<Document>("nodes")
    }

    // ── Helper: next insertion sequence number ──
    fn next_seq(&self) -> Result<i64, StoreError> {
        let counters = self.db.collection::<Document>("_counters");
        let opts = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        let result = counters.find_one_and_update(
            doc! { "_id": "nodes" },
            doc! { "$inc": { "seq": 1_i64 } },
            opts,
        )?;
        match result {
            Some(d) => d
                .get_i64("seq")
                .map_err(|e| StoreError::Backend(format!("Failed to get seq: {}", e))),
            None => Err(StoreError::Backend("Failed to generate sequence".to_string())),
        }
    }
}

fn to_bson(value: &Value) -> Result<Bson, StoreError> {
    mongodb::bson::to_bson(value).map_err(|e| StoreError::Backend(e.to_string()))
}

fn value_of(path: &str, d: &Document) -> Result<Value, StoreError> {
    d.get("value")
        .cloned()
        .map(Bson::into_relaxed_extjson)
        .ok_or_else(|| StoreError::Decode {
            path: path.to_string(),
            reason: "missing value".to_string(),
        })
}

impl Store for MongoStore {
    fn run_migrations(&self) -> Result<(), StoreError> {
        self.nodes().create_index(
            IndexModel::builder().keys(doc! { "parent": 1, "seq": 1 }).build(),
            None,
        )?;
        Ok(())
    }

    fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        check_path(path)?;
        match self.nodes().find_one(doc! { "_id": path }, None)? {
            Some(d) => Ok(Some(value_of(path, &d)?)),
            None => Ok(None),
        }
    }

    fn children(&self, path: &str) -> Result<Vec<(String, Value)>, StoreError> {
        check_path(path)?;
        let opts = FindOptions::builder().sort(doc! { "seq": 1 }).build();
        let cursor = self.nodes().find(doc! { "parent": path }, opts)?;

        let mut out = Vec::new();
        for d in cursor {
            let d = d?;
            let key = d
                .get_str("key")
                .map_err(|e| StoreError::Backend(e.to_string()))?
                .to_string();
            let value = value_of(&format!("{}/{}", path, key), &d)?;
            out.push((key, value));
        }
        Ok(out)
    }

    fn push(&self, path: &str, value: &Value) -> Result<String, StoreError> {
        check_path(path)?;
        let key = new_key();
        let full = format!("{}/{}", path, key);
        let seq = self.next_seq()?;
        self.nodes().insert_one(
            doc! {
                "_id": full.clone(),
                "parent": path,
                "key": key.clone(),
                "value": to_bson(value)?,
                "seq": seq,
            },
            None,
        )?;
        self.feed.notify(&full);
        Ok(key)
    }

    fn set(&self, path: &str, value: &Value) -> Result<(), StoreError> {
        check_path(path)?;
        let (parent, key) = split_path(path);
        let seq = self.next_seq()?;
        let opts = UpdateOptions::builder().upsert(true).build();
        self.nodes().update_one(
            doc! { "_id": path },
            doc! {
                "$set": { "parent": parent, "key": key, "value": to_bson(value)? },
                "$setOnInsert": { "seq": seq },
            },
            opts,
        )?;
        self.feed.notify(path);
        Ok(())
    }

    fn update(&self, path: &str, fields: &Map<String, Value>) -> Result<(), StoreError> {
        check_path(path)?;
        let mut set = Document::new();
        for (field, value) in fields {
            if field.is_empty() || field.contains(['.', '$']) {
                return Err(StoreError::Backend(format!("invalid field name: {}", field)));
            }
            set.insert(format!("value.{}", field), to_bson(value)?);
        }
        let result = self
            .nodes()
            .update_one(doc! { "_id": path }, doc! { "$set": set }, None)?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound(path.to_string()));
        }
        self.feed.notify(path);
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<(), StoreError> {
        check_path(path)?;
        self.nodes().delete_many(
            doc! { "$or": [ { "_id": path }, { "parent": path } ] },
            None,
        )?;
        self.feed.notify(path);
        Ok(())
    }

    fn changes(&self) -> broadcast::Receiver<String> {
        self.feed.subscribe()
    }
}
