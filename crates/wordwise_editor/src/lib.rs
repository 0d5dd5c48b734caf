//! Editor-side checking pipeline.
//!
//! A block-structured [`document::Document`] is projected to plain text,
//! checked off-thread by the [`checker`] workers, and the findings are
//! mirrored back into the document as marks. [`session::EditorSession`]
//! drives the whole loop from a single owner thread.

/// Finding ids, the per-kind finding store, and click lookup.
pub mod annotations;
/// Worker threads, protocol types, and the owner-thread client.
pub mod checker;
/// Block document model, coordinate translation, markdown import.
pub mod document;
/// Export gate and paginated output.
pub mod export;
pub mod render;
pub mod scheduler;
/// Edit/check/render orchestration.
pub mod session;

#[cfg(test)]
mod tests;

pub use annotations::{AnnotationStore, FindingId, FindingState};
pub use checker::{CheckerClient, CheckerServices};
pub use document::{extract_text, Block, BlockKind, Document, DocumentError, Mark, TextCoords};
pub use export::{ExportError, ExportStatus};
pub use scheduler::{CheckScheduler, Generation};
pub use session::{AppliedSuggestion, EditorOptions, EditorSession, TickReport};
