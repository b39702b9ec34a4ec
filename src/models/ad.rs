use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PATH: &str = "ads";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdKind {
    /// `content` is an image URL.
    Image,
    /// `content` is admin-authored markup, inserted as-is.
    Html,
}

impl AdKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AdKind::Image => "image",
            AdKind::Html => "html",
        }
    }
}

impl FromStr for AdKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(AdKind::Image),
            "html" => Ok(AdKind::Html),
            other => Err(format!("Unknown ad type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AdKind,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub active: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdDraft {
    pub title: String,
    pub kind: AdKind,
    pub content: String,
    pub active: bool,
}

impl Ad {
    pub fn from_draft(draft: &AdDraft, now: DateTime<Utc>) -> Self {
        Ad {
            title: draft.title.trim().to_string(),
            kind: draft.kind,
            content: draft.content.clone(),
            active: draft.active,
            timestamp: now,
        }
    }
}
