use std::sync::Arc;

use chrono::Utc;

use crate::error::{OpError, OpResult, Operation, OrFail};
use crate::models::{contact, Contact, ContactDraft};
use crate::store::Store;

/// Visitor-facing write side: appends contact messages.
pub struct ContactInbox {
    store: Arc<dyn Store>,
}

impl ContactInbox {
    pub fn new(store: Arc<dyn Store>) -> Self {
        ContactInbox { store }
    }

    /// Appends a new unread message and returns its key.
    pub fn submit(&self, draft: &ContactDraft) -> OpResult<String> {
        if let Some(field) = draft.missing_field() {
            return Err(OpError::new(
                Operation::SubmitContact,
                format!("the {} field is required", field),
            ));
        }
        let record = Contact::received(draft, Utc::now());
        let value = serde_json::to_value(&record).or_fail(Operation::SubmitContact)?;
        let key = self
            .store
            .push(contact::PATH, &value)
            .or_fail(Operation::SubmitContact)?;
        log::info!("Contact message {} received from {}", key, record.email);
        Ok(key)
    }
}
