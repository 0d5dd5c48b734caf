//! Document history collaborator.

use crate::constants::DEFAULT_HISTORY_LIMIT;
use crate::error::HistoryError;
use crate::models::{HistoryItem, HistoryUpdate};
use std::sync::Mutex;

/// Storage for finished drafts.
pub trait HistoryStore: Send + Sync {
    /// Record a new draft.
    ///
    /// # Returns
    /// The stored item, including its generated id.
    ///
    /// # Errors
    /// Returns [`HistoryError::Invalid`] when the backend rejects the entry.
    fn save(&self, title: &str, prompt: &str, content: &str) -> Result<HistoryItem, HistoryError>;

    /// List stored drafts, newest first.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    fn list(&self) -> Result<Vec<HistoryItem>, HistoryError>;

    /// Apply a partial update to an existing draft.
    ///
    /// # Errors
    /// Returns [`HistoryError::NotFound`] when `id` is unknown.
    fn update(&self, id: &str, update: HistoryUpdate) -> Result<HistoryItem, HistoryError>;

    /// Delete a draft.
    ///
    /// # Errors
    /// Returns [`HistoryError::NotFound`] when `id` is unknown.
    fn delete(&self, id: &str) -> Result<(), HistoryError>;
}

/// Bounded in-process history. The oldest entries fall off once `limit` is reached.
pub struct MemoryHistory {
    items: Mutex<Vec<HistoryItem>>,
    limit: usize,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl MemoryHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            limit: limit.max(1),
        }
    }

    fn with_items<R>(&self, f: impl FnOnce(&mut Vec<HistoryItem>) -> R) -> R {
        let mut items = self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut items)
    }
}

impl HistoryStore for MemoryHistory {
    fn save(&self, title: &str, prompt: &str, content: &str) -> Result<HistoryItem, HistoryError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(HistoryError::Invalid("title is required".to_string()));
        }
        let item = HistoryItem::new(title.to_string(), prompt.to_string(), content.to_string());
        self.with_items(|items| {
            items.insert(0, item.clone());
            items.truncate(self.limit);
        });
        Ok(item)
    }

    fn list(&self) -> Result<Vec<HistoryItem>, HistoryError> {
        Ok(self.with_items(|items| items.clone()))
    }

    fn update(&self, id: &str, update: HistoryUpdate) -> Result<HistoryItem, HistoryError> {
        self.with_items(|items| {
            let item = items
                .iter_mut()
                .find(|item| item.id == id)
                .ok_or(HistoryError::NotFound)?;
            item.apply(update);
            Ok(item.clone())
        })
    }

    fn delete(&self, id: &str) -> Result<(), HistoryError> {
        self.with_items(|items| {
            let before = items.len();
            items.retain(|item| item.id != id);
            if items.len() == before {
                Err(HistoryError::NotFound)
            } else {
                Ok(())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_keeps_newest_first_and_respects_limit() {
        let history = MemoryHistory::new(2);
        history.save("one", "p", "c").expect("save");
        history.save("two", "p", "c").expect("save");
        history.save("three", "p", "c").expect("save");
        let titles: Vec<String> = history
            .list()
            .expect("list")
            .into_iter()
            .map(|item| item.title)
            .collect();
        assert_eq!(titles, vec!["three".to_string(), "two".to_string()]);
    }

    #[test]
    fn save_rejects_blank_title() {
        let history = MemoryHistory::default();
        assert!(matches!(
            history.save("  ", "p", "c"),
            Err(HistoryError::Invalid(_))
        ));
    }

    #[test]
    fn update_and_delete_by_id() {
        let history = MemoryHistory::default();
        let item = history.save("draft", "prompt", "body").expect("save");
        let updated = history
            .update(
                &item.id,
                HistoryUpdate {
                    content: Some("new body".to_string()),
                    ..HistoryUpdate::default()
                },
            )
            .expect("update");
        assert_eq!(updated.content, "new body");
        assert_eq!(updated.title, "draft");
        assert!(updated.updated_at >= item.updated_at);

        history.delete(&item.id).expect("delete");
        assert!(history.list().expect("list").is_empty());
        assert_eq!(history.delete(&item.id), Err(HistoryError::NotFound));
        assert_eq!(
            history.update(&item.id, HistoryUpdate::default()).map(|_| ()),
            Err(HistoryError::NotFound)
        );
    }
}
