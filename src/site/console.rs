use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::error::{OpError, OpResult, Operation, OrFail};
use crate::files::{extension_for, FileStore};
use crate::models::{ad, contact, design, maintenance};
use crate::models::{Ad, AdDraft, Contact, Design, DesignDraft, Maintenance, Record};
use crate::store::{child_path, read_collection, read_document, read_record, Store, StoreError, Subscription};

/// Answer to a deletion prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    /// Only an explicit `yes` confirms.
    pub fn from_answer(answer: Option<&str>) -> Self {
        match answer.map(str::trim) {
            Some(a) if a.eq_ignore_ascii_case("yes") => Confirmation::Confirmed,
            _ => Confirmation::Declined,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    Kept,
}

/// Dashboard counters. `None` when that collection could not be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub contacts: Option<usize>,
    pub designs: Option<usize>,
    pub active_ads: Option<usize>,
}

/// Uploaded design picture, read fully into memory.
#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: String,
}

impl ImageUpload {
    fn mime(&self) -> String {
        match &self.content_type {
            Some(ct) if ct.starts_with("image/") => ct.clone(),
            _ => match extension_for(None, &self.file_name).as_str() {
                "jpg" | "jpeg" => "image/jpeg".to_string(),
                "svg" => "image/svg+xml".to_string(),
                "bin" => "application/octet-stream".to_string(),
                ext => format!("image/{}", ext),
            },
        }
    }

    /// `data:<mime>;base64,<payload>`
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime(), STANDARD.encode(&self.bytes))
    }
}

pub fn count_active(ads: &[Record<Ad>]) -> usize {
    ads.iter().filter(|r| r.value.active).count()
}

/// Back-office operations over the three collections and the maintenance
/// singleton.
pub struct AdminConsole {
    store: Arc<dyn Store>,
    files: Arc<dyn FileStore>,
    inline_images: bool,
}

impl AdminConsole {
    pub fn new(store: Arc<dyn Store>, files: Arc<dyn FileStore>, inline_images: bool) -> Self {
        AdminConsole {
            store,
            files,
            inline_images,
        }
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub fn contacts(&self) -> Result<Vec<Record<Contact>>, StoreError> {
        read_collection(&*self.store, contact::PATH)
    }

    pub fn designs(&self) -> Result<Vec<Record<Design>>, StoreError> {
        read_collection(&*self.store, design::PATH)
    }

    pub fn ads(&self) -> Result<Vec<Record<Ad>>, StoreError> {
        read_collection(&*self.store, ad::PATH)
    }

    pub fn maintenance(&self) -> Result<Maintenance, StoreError> {
        read_document(&*self.store, maintenance::PATH)
    }

    /// Each counter reads its own collection; one failure does not hide the others.
    pub fn stats(&self) -> Stats {
        fn count<T>(what: &str, read: Result<Vec<T>, StoreError>, f: impl Fn(&[T]) -> usize) -> Option<usize> {
            match read {
                Ok(items) => Some(f(&items)),
                Err(e) => {
                    log::error!("Could not count {}: {}", what, e);
                    None
                }
            }
        }
        Stats {
            contacts: count("contacts", self.contacts(), <[_]>::len),
            designs: count("designs", self.designs(), <[_]>::len),
            active_ads: count("ads", self.ads(), count_active),
        }
    }

    pub fn subscribe_contacts(&self) -> Subscription<Vec<Record<Contact>>> {
        Subscription::collection(self.store.clone(), contact::PATH)
    }

    pub fn subscribe_designs(&self) -> Subscription<Vec<Record<Design>>> {
        Subscription::collection(self.store.clone(), design::PATH)
    }

    pub fn subscribe_ads(&self) -> Subscription<Vec<Record<Ad>>> {
        Subscription::collection(self.store.clone(), ad::PATH)
    }

    pub fn subscribe_maintenance(&self) -> Subscription<Maintenance> {
        Subscription::document(self.store.clone(), maintenance::PATH)
    }

    // ── Contacts ────────────────────────────────────────────────────

    /// Full message for display. Marking it read is fire-and-forget: a
    /// failed write is logged and the message is still shown.
    pub fn view_contact(&self, key: &str) -> OpResult<Record<Contact>> {
        let path = child_path(contact::PATH, key);
        let mut value: Contact = read_record(&*self.store, &path)
            .or_fail(Operation::ViewContact)?
            .ok_or_else(|| OpError::new(Operation::ViewContact, StoreError::NotFound(path.clone())))?;

        if !value.read {
            let mut fields = Map::new();
            fields.insert("read".to_string(), Value::Bool(true));
            match self.store.update(&path, &fields).or_fail(Operation::MarkContactRead) {
                Ok(()) => value.read = true,
                Err(e) => log::error!("{}", e),
            }
        }
        Ok(Record {
            key: key.to_string(),
            value,
        })
    }

    pub fn delete_contact(&self, key: &str, answer: Confirmation) -> OpResult<Removal> {
        self.remove(contact::PATH, key, answer, Operation::DeleteContact)
    }

    // ── Designs ─────────────────────────────────────────────────────

    pub fn create_design(&self, draft: &DesignDraft, image: &ImageUpload) -> OpResult<String> {
        if draft.title.trim().is_empty() {
            return Err(OpError::new(Operation::CreateDesign, "a title is required"));
        }
        if image.bytes.is_empty() {
            return Err(OpError::new(Operation::CreateDesign, "please select an image"));
        }

        let image_url = if self.inline_images {
            image.data_url()
        } else {
            self.files
                .upload(&image.file_name, &image.bytes, image.content_type.as_deref())
                .or_fail(Operation::CreateDesign)?
        };

        let record = Design::from_draft(draft, image_url, Utc::now());
        let value = serde_json::to_value(&record).or_fail(Operation::CreateDesign)?;
        let key = self.store.push(design::PATH, &value).or_fail(Operation::CreateDesign)?;
        log::info!("Design {} added ({})", key, record.title);
        Ok(key)
    }

    pub fn delete_design(&self, key: &str, answer: Confirmation) -> OpResult<Removal> {
        self.remove(design::PATH, key, answer, Operation::DeleteDesign)
    }

    // ── Ads ─────────────────────────────────────────────────────────

    pub fn create_ad(&self, draft: &AdDraft) -> OpResult<String> {
        if draft.title.trim().is_empty() || draft.content.trim().is_empty() {
            return Err(OpError::new(Operation::CreateAd, "title and content are required"));
        }
        let record = Ad::from_draft(draft, Utc::now());
        let value = serde_json::to_value(&record).or_fail(Operation::CreateAd)?;
        let key = self.store.push(ad::PATH, &value).or_fail(Operation::CreateAd)?;
        log::info!("Ad {} added ({}, {})", key, record.title, record.kind.as_str());
        Ok(key)
    }

    /// Flips `active` and nothing else. Returns the new state.
    pub fn toggle_ad(&self, key: &str) -> OpResult<bool> {
        let path = child_path(ad::PATH, key);
        let current: Ad = read_record(&*self.store, &path)
            .or_fail(Operation::ToggleAd)?
            .ok_or_else(|| OpError::new(Operation::ToggleAd, StoreError::NotFound(path.clone())))?;

        let active = !current.active;
        let mut fields = Map::new();
        fields.insert("active".to_string(), json!(active));
        self.store.update(&path, &fields).or_fail(Operation::ToggleAd)?;
        Ok(active)
    }

    pub fn delete_ad(&self, key: &str, answer: Confirmation) -> OpResult<Removal> {
        self.remove(ad::PATH, key, answer, Operation::DeleteAd)
    }

    // ── Maintenance ─────────────────────────────────────────────────

    /// Overwrites the whole pair; the last writer wins.
    pub fn set_maintenance(&self, state: &Maintenance) -> OpResult<()> {
        let value = serde_json::to_value(state).or_fail(Operation::SetMaintenance)?;
        self.store
            .set(maintenance::PATH, &value)
            .or_fail(Operation::SetMaintenance)?;
        log::info!("Maintenance mode {}", if state.enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    fn remove(&self, collection: &str, key: &str, answer: Confirmation, op: Operation) -> OpResult<Removal> {
        if answer == Confirmation::Declined {
            return Ok(Removal::Kept);
        }
        self.store.remove(&child_path(collection, key)).or_fail(op)?;
        log::info!("Removed {}/{}", collection, key);
        Ok(Removal::Removed)
    }
}
