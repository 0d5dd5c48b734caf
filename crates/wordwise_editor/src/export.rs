//! Export gate and paginated file output.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Lines written per page when no explicit size is given.
pub const DEFAULT_LINES_PER_PAGE: usize = 54;

const PAGE_BREAK: &str = "\n\u{000C}\n";

/// Whether the document may be exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Ready,
    Blocked {
        spelling: usize,
        grammar: usize,
        profane_words: Vec<String>,
    },
}

impl ExportStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ExportStatus::Ready)
    }

    /// Outstanding spelling, grammar, and profanity issues combined.
    pub fn issue_count(&self) -> usize {
        match self {
            ExportStatus::Ready => 0,
            ExportStatus::Blocked {
                spelling,
                grammar,
                profane_words,
            } => spelling + grammar + profane_words.len(),
        }
    }

    pub fn profane_words(&self) -> &[String] {
        match self {
            ExportStatus::Ready => &[],
            ExportStatus::Blocked { profane_words, .. } => profane_words,
        }
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportStatus::Ready => f.write_str("ready to export"),
            ExportStatus::Blocked { profane_words, .. } => {
                let count = self.issue_count();
                let noun = if count == 1 { "issue remains" } else { "issues remain" };
                write!(f, "cannot export while {} {}", count, noun)?;
                if !profane_words.is_empty() {
                    write!(f, " (flagged words: {})", profane_words.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{0}")]
    Blocked(ExportStatus),

    #[error("no document is open")]
    NoDocument,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Export is ready only when there are no spelling, grammar, or profanity issues.
pub fn export_readiness(spelling: usize, grammar: usize, profane_words: &[String]) -> ExportStatus {
    if spelling == 0 && grammar == 0 && profane_words.is_empty() {
        ExportStatus::Ready
    } else {
        ExportStatus::Blocked {
            spelling,
            grammar,
            profane_words: profane_words.to_vec(),
        }
    }
}

/// Split rendered markdown into pages of at most `lines_per_page` lines.
///
/// Always yields at least one page.
pub fn paginate(markdown: &str, lines_per_page: usize) -> Vec<String> {
    let per_page = lines_per_page.max(1);
    let lines: Vec<&str> = markdown.lines().collect();
    if lines.is_empty() {
        return vec![String::new()];
    }
    lines
        .chunks(per_page)
        .map(|chunk| chunk.join("\n"))
        .collect()
}

/// Write pages separated by form feeds.
///
/// # Errors
/// Returns [`ExportError::Io`] when the file cannot be written.
pub fn write_export(path: &Path, pages: &[String]) -> Result<(), ExportError> {
    let mut body = pages.join(PAGE_BREAK);
    body.push('\n');
    fs::write(path, body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readiness_requires_all_three_counts_at_zero() {
        assert!(export_readiness(0, 0, &[]).is_ready());
        for status in [
            export_readiness(1, 0, &[]),
            export_readiness(0, 2, &[]),
            export_readiness(0, 0, &["damn".to_string()]),
        ] {
            assert!(!status.is_ready());
            assert!(status.issue_count() > 0);
        }
    }

    #[test]
    fn blocked_message_lists_profane_words() {
        let status = export_readiness(1, 1, &["damn".to_string(), "hell".to_string()]);
        assert_eq!(
            status.to_string(),
            "cannot export while 4 issues remain (flagged words: damn, hell)"
        );
        assert_eq!(
            export_readiness(1, 0, &[]).to_string(),
            "cannot export while 1 issue remains"
        );
    }

    #[test]
    fn paginate_chunks_lines() {
        let pages = paginate("a\nb\nc\nd\ne", 2);
        assert_eq!(pages, vec!["a\nb", "c\nd", "e"]);
        assert_eq!(paginate("", 10), vec![String::new()]);
        assert_eq!(paginate("only", 0), vec!["only"]);
    }

    #[test]
    fn write_export_separates_pages_with_form_feeds() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("out.md");
        write_export(&path, &["one".to_string(), "two".to_string()]).expect("write");
        let written = std::fs::read_to_string(&path).expect("read");
        assert_eq!(written, "one\n\u{000C}\ntwo\n");
    }
}
