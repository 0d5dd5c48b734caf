//! Conversion between plain-text offsets and document positions.
//!
//! This is the only place that knows how the plain-text projection lines up
//! with block tokens. Offsets inside the block separator map onto the
//! structural positions between two blocks.

use super::Document;
use std::ops::Range;

#[derive(Debug, Clone, Copy)]
struct BlockSpan {
    text_start: usize,
    doc_start: usize,
    len: usize,
}

impl BlockSpan {
    fn text_end(&self) -> usize {
        self.text_start + self.len
    }

    fn doc_end(&self) -> usize {
        self.doc_start + self.len
    }
}

/// Snapshot of a document's block layout used for coordinate conversion.
///
/// Built from the document it converts for; rebuild it after every edit.
#[derive(Debug, Clone)]
pub struct TextCoords {
    spans: Vec<BlockSpan>,
    text_len: usize,
    size: usize,
}

impl TextCoords {
    pub fn new(doc: &Document) -> Self {
        let separator = wordwise_core::constants::BLOCK_SEPARATOR.chars().count();
        let mut spans = Vec::with_capacity(doc.blocks().len());
        let mut text_start = 0;
        let mut open = 0;
        for block in doc.blocks() {
            let len = block.len_chars();
            spans.push(BlockSpan {
                text_start,
                doc_start: open + 1,
                len,
            });
            text_start += len + separator;
            open += len + 2;
        }
        let text_len = spans.last().map(BlockSpan::text_end).unwrap_or(0);
        Self {
            spans,
            text_len,
            size: open,
        }
    }

    /// Document size the layout was captured at.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Length of the plain-text projection in chars.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Document position of plain-text offset 0.
    pub fn structural_offset(&self) -> usize {
        self.spans.first().map(|span| span.doc_start).unwrap_or(0)
    }

    /// Map a plain-text offset to a document position.
    ///
    /// # Returns
    /// `None` when `offset` lies past the end of the plain text.
    pub fn text_to_doc(&self, offset: usize) -> Option<usize> {
        if offset > self.text_len {
            return None;
        }
        let index = self
            .spans
            .partition_point(|span| span.text_start <= offset)
            .checked_sub(1)?;
        let span = self.spans[index];
        if offset <= span.text_end() {
            return Some(span.doc_start + (offset - span.text_start));
        }
        // Inside the separator after this block.
        Some(span.doc_end() + (offset - span.text_end()))
    }

    pub fn text_range_to_doc(&self, range: Range<usize>) -> Option<Range<usize>> {
        Some(self.text_to_doc(range.start)?..self.text_to_doc(range.end)?)
    }

    /// Map a document position to a plain-text offset.
    ///
    /// # Returns
    /// `None` for positions before the first block's text or after the last
    /// block's text.
    pub fn doc_to_text(&self, pos: usize) -> Option<usize> {
        let index = self
            .spans
            .partition_point(|span| span.doc_start <= pos)
            .checked_sub(1)?;
        let span = self.spans[index];
        if pos <= span.doc_end() {
            return Some(span.text_start + (pos - span.doc_start));
        }
        if index + 1 == self.spans.len() {
            return None;
        }
        Some(span.text_end() + (pos - span.doc_end()))
    }

    pub fn doc_range_to_text(&self, range: Range<usize>) -> Option<Range<usize>> {
        let start = self.doc_to_text(range.start)?;
        let end = self.doc_to_text(range.end)?;
        (start <= end).then_some(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Block;

    fn coords(texts: &[&str]) -> TextCoords {
        TextCoords::new(&Document::new(
            texts.iter().map(|text| Block::paragraph(text)).collect(),
        ))
    }

    #[test]
    fn structural_offset_is_one_for_flat_blocks() {
        assert_eq!(coords(&["abc"]).structural_offset(), 1);
        assert_eq!(coords(&["", "abc", "de"]).structural_offset(), 1);
    }

    #[test]
    fn offset_is_uniform_across_blocks() {
        let coords = coords(&["Ths is", "a test", "", "end"]);
        for offset in 0..=coords.text_len() {
            assert_eq!(coords.text_to_doc(offset), Some(offset + 1), "offset {offset}");
            assert_eq!(coords.doc_to_text(offset + 1), Some(offset));
        }
        assert_eq!(coords.text_to_doc(coords.text_len() + 1), None);
    }

    #[test]
    fn positions_outside_text_do_not_map() {
        let coords = coords(&["ab", "cd"]);
        assert_eq!(coords.size(), 8);
        assert_eq!(coords.doc_to_text(0), None);
        assert_eq!(coords.doc_to_text(7), Some(6));
        assert_eq!(coords.doc_to_text(8), None);
    }

    #[test]
    fn ranges_convert_both_ways() {
        let coords = coords(&["Ths is", "a test"]);
        assert_eq!(coords.text_range_to_doc(8..9), Some(9..10));
        assert_eq!(coords.doc_range_to_text(9..10), Some(8..9));
        assert_eq!(coords.doc_range_to_text(10..9), None);
        assert_eq!(coords.text_range_to_doc(10..40), None);
    }
}
