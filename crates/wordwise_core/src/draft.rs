//! Draft generation collaborator.

use crate::error::DraftError;

/// Produces a markdown draft from a writing prompt.
pub trait DraftGenerator: Send + Sync {
    /// # Errors
    /// Returns [`DraftError::Empty`] for a blank prompt, or
    /// [`DraftError::Backend`] when generation fails.
    fn generate(&self, prompt: &str) -> Result<String, DraftError>;
}

/// Generator that always returns the same markdown seed.
#[derive(Debug, Clone)]
pub struct StaticDraft {
    seed: String,
}

impl Default for StaticDraft {
    fn default() -> Self {
        Self::new("# hello world")
    }
}

impl StaticDraft {
    pub fn new(seed: impl Into<String>) -> Self {
        Self { seed: seed.into() }
    }
}

impl DraftGenerator for StaticDraft {
    fn generate(&self, prompt: &str) -> Result<String, DraftError> {
        if prompt.trim().is_empty() {
            return Err(DraftError::Empty);
        }
        Ok(self.seed.clone())
    }
}
