//! Frontmatter handling for storygen documents.
//!
//! A document may start with a block delimited by lines of exactly `---`:
//!
//! ```text
//! ---
//! aliases:
//!   - execon
//! related_concepts:
//!   - heist
//! ---
//! # Steg
//! ...
//! ```
//!
//! The closing delimiter must be followed by a newline, and the block must
//! hold at least one line. Everything after the closing delimiter is the body.

mod frontmatter;
mod includes;

pub use frontmatter::{FieldValue, Frontmatter, parse_block, parse_frontmatter};
pub use includes::{INCLUDES_FIELD, includes_of, parse_includes};

/// Delimiter line opening and closing a frontmatter block.
pub const DELIMITER: &str = "---";

/// A document split at its frontmatter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontmatterSplit<'a> {
    /// Lines between the delimiters, without the final newline.
    pub block: &'a str,
    /// Everything after the closing delimiter line.
    pub body: &'a str,
}

/// Locate the frontmatter block at the very start of `text`.
pub fn split_frontmatter(text: &str) -> Option<FrontmatterSplit<'_>> {
    let mut lines = text.split_inclusive('\n');

    let first = lines.next()?;
    if !is_delimiter(first.trim_start_matches('\u{feff}')) || !first.ends_with('\n') {
        return None;
    }

    let block_start = first.len();
    let mut offset = block_start;

    for line in lines {
        if is_delimiter(line) && offset > block_start {
            if !line.ends_with('\n') {
                return None;
            }
            let block = &text[block_start..offset];
            let block = block.strip_suffix('\n').unwrap_or(block);
            let block = block.strip_suffix('\r').unwrap_or(block);
            return Some(FrontmatterSplit {
                block,
                body: &text[offset + line.len()..],
            });
        }
        offset += line.len();
    }

    None
}

/// The body of `text`: the part after the frontmatter block, or the whole
/// text when there is none.
pub fn strip_frontmatter(text: &str) -> &str {
    split_frontmatter(text).map_or(text, |split| split.body)
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == DELIMITER
}
