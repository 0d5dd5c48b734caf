//! Saved drafts consumed by the history collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A finished draft recorded after the writer is satisfied with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub title: String,
    pub prompt: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied to an existing history item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryUpdate {
    pub title: Option<String>,
    pub prompt: Option<String>,
    pub content: Option<String>,
}

impl HistoryItem {
    /// Create a new item stamped with the current time.
    pub fn new(title: String, prompt: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            prompt,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the set fields of `update` and bump `updated_at`.
    pub fn apply(&mut self, update: HistoryUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(prompt) = update.prompt {
            self.prompt = prompt;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        self.updated_at = Utc::now();
    }
}
