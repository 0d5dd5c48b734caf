//! Block document model with ProseMirror-style positions.
//!
//! Every block contributes an opening token, its chars, and a closing token,
//! so block `i` spans `len_i + 2` positions. Text positions of block `i` run
//! from `open_i + 1` to `open_i + 1 + len_i` inclusive. Marks live on the
//! document and are remapped by every edit.

pub mod coords;
mod markdown;

use crate::annotations::FindingId;
use ropey::Rope;
use std::ops::Range;
use thiserror::Error;
use wordwise_core::constants::BLOCK_SEPARATOR;
use wordwise_core::CheckKind;

pub use coords::TextCoords;

/// Rejected document command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Range {from}..{to} is outside the document (size {size})")]
    OutOfBounds { from: usize, to: usize, size: usize },

    #[error("Range {from}..{to} does not lie inside a single block")]
    CrossesBlocks { from: usize, to: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    CodeBlock,
    ListItem,
    Quote,
}

/// A textblock node holding inline text.
#[derive(Debug, Clone)]
pub struct Block {
    kind: BlockKind,
    text: Rope,
}

impl Block {
    pub fn new(kind: BlockKind, text: &str) -> Self {
        Self {
            kind,
            text: Rope::from_str(text),
        }
    }

    pub fn paragraph(text: &str) -> Self {
        Self::new(BlockKind::Paragraph, text)
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn rope(&self) -> &Rope {
        &self.text
    }

    pub fn text(&self) -> String {
        self.text.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    fn to_markdown(&self) -> String {
        let text = self.text();
        match self.kind {
            BlockKind::Paragraph => text,
            BlockKind::Heading(level) => {
                format!("{} {}", "#".repeat(usize::from(level.clamp(1, 6))), text)
            }
            BlockKind::CodeBlock => format!("```\n{}\n```", text),
            BlockKind::ListItem => format!("- {}", text),
            BlockKind::Quote => text
                .lines()
                .map(|line| format!("> {}", line))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A visual marker attached to a document range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    pub kind: CheckKind,
    pub range: Range<usize>,
    /// The misspelled word or grammar message shown on hover.
    pub label: String,
    pub finding: FindingId,
}

/// Mutable rich-text document. Mutated only through its command methods.
#[derive(Debug, Clone)]
pub struct Document {
    blocks: Vec<Block>,
    marks: Vec<Mark>,
    revision: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Document {
    /// Build a document from blocks. An empty list yields one empty paragraph.
    pub fn new(mut blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            blocks.push(Block::paragraph(""));
        }
        Self {
            blocks,
            marks: Vec::new(),
            revision: 0,
        }
    }

    /// Build a document from a markdown seed.
    pub fn from_markdown(source: &str) -> Self {
        Self::new(markdown::parse_blocks(source))
    }

    /// Build a document with one paragraph per blank-line separated chunk.
    pub fn from_plain_text(text: &str) -> Self {
        Self::new(
            text.split(BLOCK_SEPARATOR)
                .map(|chunk| chunk.trim_matches('\n'))
                .filter(|chunk| !chunk.trim().is_empty())
                .map(Block::paragraph)
                .collect(),
        )
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn marks_of(&self, kind: CheckKind) -> impl Iterator<Item = &Mark> + '_ {
        self.marks.iter().filter(move |mark| mark.kind == kind)
    }

    /// Monotonic edit counter, bumped once per successful text command.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Total number of positions, counting block tokens.
    pub fn size(&self) -> usize {
        self.blocks.iter().map(|block| block.len_chars() + 2).sum()
    }

    /// Plain-text projection: block texts joined by the block separator.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR)
    }

    /// Text covered by a document range, if it maps onto plain text.
    pub fn text_between(&self, range: Range<usize>) -> Option<String> {
        let text_range = TextCoords::new(self).doc_range_to_text(range)?;
        Some(
            self.plain_text()
                .chars()
                .skip(text_range.start)
                .take(text_range.len())
                .collect(),
        )
    }

    pub fn to_markdown(&self) -> String {
        self.blocks
            .iter()
            .map(Block::to_markdown)
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR)
    }

    /// Insert `text` at document position `pos`.
    ///
    /// # Errors
    /// See [`Document::replace_range`].
    pub fn insert_text(&mut self, pos: usize, text: &str) -> Result<(), DocumentError> {
        self.replace_range(pos..pos, text)
    }

    /// Delete the chars covered by `range`.
    ///
    /// # Errors
    /// See [`Document::replace_range`].
    pub fn delete_range(&mut self, range: Range<usize>) -> Result<(), DocumentError> {
        self.replace_range(range, "")
    }

    /// Replace `range` with `text` as one edit with one revision bump.
    ///
    /// Marks ending at or before the edit stay, marks starting at or after its
    /// end shift by the length delta, and overlapping marks are dropped.
    ///
    /// # Errors
    /// Returns [`DocumentError::OutOfBounds`] when the range exceeds the
    /// document, or [`DocumentError::CrossesBlocks`] when it does not sit
    /// inside a single block's text.
    pub fn replace_range(&mut self, range: Range<usize>, text: &str) -> Result<(), DocumentError> {
        let (block_index, local) = self.resolve_text_range(&range)?;
        if local.is_empty() && text.is_empty() {
            return Ok(());
        }

        let rope = &mut self.blocks[block_index].text;
        if !local.is_empty() {
            rope.remove(local.clone());
        }
        if !text.is_empty() {
            rope.insert(local.start, text);
        }
        self.revision = self.revision.wrapping_add(1);

        let inserted = text.chars().count();
        self.map_marks(&range, inserted);
        Ok(())
    }

    /// Attach a mark.
    ///
    /// # Errors
    /// Returns [`DocumentError::OutOfBounds`] for empty, inverted, or
    /// oversized ranges.
    pub fn add_mark(&mut self, mark: Mark) -> Result<(), DocumentError> {
        let size = self.size();
        if mark.range.start >= mark.range.end || mark.range.end > size {
            return Err(DocumentError::OutOfBounds {
                from: mark.range.start,
                to: mark.range.end,
                size,
            });
        }
        self.marks.push(mark);
        Ok(())
    }

    /// Remove every mark of `kind`, returning how many were removed.
    pub fn remove_marks(&mut self, kind: CheckKind) -> usize {
        let before = self.marks.len();
        self.marks.retain(|mark| mark.kind != kind);
        before - self.marks.len()
    }

    /// Remove marks of `kind` overlapping `range`, returning how many were removed.
    pub fn remove_marks_in(&mut self, kind: CheckKind, range: Range<usize>) -> usize {
        let before = self.marks.len();
        self.marks.retain(|mark| {
            mark.kind != kind || mark.range.end <= range.start || mark.range.start >= range.end
        });
        before - self.marks.len()
    }

    /// Map a document range onto `(block index, char range inside the block)`.
    /// Check that `range` lies inside a single block's text.
    ///
    /// # Errors
    /// The same rejections as [`Document::replace_range`].
    pub fn validate_range(&self, range: &Range<usize>) -> Result<(), DocumentError> {
        self.resolve_text_range(range).map(|_| ())
    }

    fn resolve_text_range(
        &self,
        range: &Range<usize>,
    ) -> Result<(usize, Range<usize>), DocumentError> {
        let size = self.size();
        if range.start > range.end || range.end > size {
            return Err(DocumentError::OutOfBounds {
                from: range.start,
                to: range.end,
                size,
            });
        }

        let mut open = 0;
        for (index, block) in self.blocks.iter().enumerate() {
            let content_start = open + 1;
            let content_end = content_start + block.len_chars();
            if range.start >= content_start && range.start <= content_end {
                if range.end > content_end {
                    break;
                }
                return Ok((
                    index,
                    range.start - content_start..range.end - content_start,
                ));
            }
            open = content_end + 1;
        }

        Err(DocumentError::CrossesBlocks {
            from: range.start,
            to: range.end,
        })
    }

    fn map_marks(&mut self, edited: &Range<usize>, inserted: usize) {
        let removed = edited.end - edited.start;
        self.marks.retain_mut(|mark| {
            if mark.range.end <= edited.start {
                return true;
            }
            if mark.range.start >= edited.end {
                mark.range.start = mark.range.start - removed + inserted;
                mark.range.end = mark.range.end - removed + inserted;
                return true;
            }
            false
        });
    }
}

/// Plain-text projection of `doc`.
pub fn extract_text(doc: &Document) -> String {
    doc.plain_text()
}
