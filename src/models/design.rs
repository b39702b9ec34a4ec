use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PATH: &str = "designs";

/// Gallery entry. Created and deleted by the admin, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Design {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    /// `data:` URL or a file-store URL; empty renders without a picture.
    #[serde(default)]
    pub image: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesignDraft {
    pub title: String,
    pub category: String,
}

impl Design {
    pub fn from_draft(draft: &DesignDraft, image: String, now: DateTime<Utc>) -> Self {
        Design {
            title: draft.title.trim().to_string(),
            category: draft.category.trim().to_string(),
            image,
            timestamp: now,
        }
    }
}
