//! Markdown seed parsing into flat textblocks.

use super::{Block, BlockKind};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    text: String,
    list_depth: usize,
    quote_depth: usize,
}

impl BlockBuilder {
    /// Kind used for plain paragraphs given the enclosing containers.
    fn paragraph_kind(&self) -> BlockKind {
        if self.list_depth > 0 {
            BlockKind::ListItem
        } else if self.quote_depth > 0 {
            BlockKind::Quote
        } else {
            BlockKind::Paragraph
        }
    }

    fn flush(&mut self, kind: BlockKind) {
        let text = std::mem::take(&mut self.text);
        let text = match kind {
            BlockKind::CodeBlock => text.trim_end_matches('\n').to_string(),
            _ => text.trim().to_string(),
        };
        if !text.is_empty() {
            self.blocks.push(Block::new(kind, &text));
        }
    }

    /// Flush loose text (tight list items carry no paragraph wrapper).
    fn flush_pending(&mut self) {
        if !self.text.trim().is_empty() {
            let kind = self.paragraph_kind();
            self.flush(kind);
        } else {
            self.text.clear();
        }
    }
}

pub(super) fn parse_blocks(source: &str) -> Vec<Block> {
    let mut builder = BlockBuilder::default();

    for event in Parser::new(source) {
        match event {
            Event::Start(Tag::Paragraph | Tag::Heading { .. } | Tag::CodeBlock(_)) => {
                builder.flush_pending();
            }
            Event::Start(Tag::List(_)) => builder.flush_pending(),
            Event::Start(Tag::Item) => {
                builder.flush_pending();
                builder.list_depth += 1;
            }
            Event::Start(Tag::BlockQuote(_)) => {
                builder.flush_pending();
                builder.quote_depth += 1;
            }
            Event::End(TagEnd::Paragraph) => {
                let kind = builder.paragraph_kind();
                builder.flush(kind);
            }
            Event::End(TagEnd::Heading(level)) => builder.flush(BlockKind::Heading(level as u8)),
            Event::End(TagEnd::CodeBlock) => builder.flush(BlockKind::CodeBlock),
            Event::End(TagEnd::Item) => {
                builder.flush_pending();
                builder.list_depth = builder.list_depth.saturating_sub(1);
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                builder.flush_pending();
                builder.quote_depth = builder.quote_depth.saturating_sub(1);
            }
            Event::Text(text) | Event::Code(text) => builder.text.push_str(&text),
            Event::SoftBreak => builder.text.push(' '),
            Event::HardBreak => builder.text.push('\n'),
            _ => {}
        }
    }
    builder.flush_pending();

    builder.blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_texts(source: &str) -> Vec<(BlockKind, String)> {
        parse_blocks(source)
            .into_iter()
            .map(|block| (block.kind(), block.text()))
            .collect()
    }

    #[test]
    fn parses_block_kinds_and_drops_inline_markup() {
        let source = "# Title\n\nSome *emphasis* and `code`\nwrapped.\n\n- one\n- two\n\n> quoted\n\n```rust\nfn main() {}\n```\n";
        assert_eq!(
            kinds_and_texts(source),
            vec![
                (BlockKind::Heading(1), "Title".to_string()),
                (BlockKind::Paragraph, "Some emphasis and code wrapped.".to_string()),
                (BlockKind::ListItem, "one".to_string()),
                (BlockKind::ListItem, "two".to_string()),
                (BlockKind::Quote, "quoted".to_string()),
                (BlockKind::CodeBlock, "fn main() {}".to_string()),
            ]
        );
    }

    #[test]
    fn loose_list_items_become_list_blocks() {
        let source = "- first item\n\n- second item\n";
        assert_eq!(
            kinds_and_texts(source),
            vec![
                (BlockKind::ListItem, "first item".to_string()),
                (BlockKind::ListItem, "second item".to_string()),
            ]
        );
    }

    #[test]
    fn empty_source_has_no_blocks() {
        assert!(parse_blocks("").is_empty());
        assert!(parse_blocks("\n\n  \n").is_empty());
    }
}
