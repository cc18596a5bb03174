//! `includes` list extraction.
//!
//! A narrower scan than [`crate::parse_block`]: only the first `includes:`
//! list is read and everything else in the block is skipped.

use storygen_shared::DocRef;

use crate::frontmatter::{Line, classify};
use crate::split_frontmatter;

/// Field name holding include references.
pub const INCLUDES_FIELD: &str = "includes";

/// Extract `includes` items from the lines of a frontmatter block.
pub fn parse_includes(block: &str) -> Vec<DocRef> {
    let mut includes = Vec::new();
    let mut in_section = false;

    for line in block.lines() {
        match classify(line) {
            Line::Key { key, value } if !in_section => {
                in_section = key == INCLUDES_FIELD && value.is_empty();
            }
            Line::Item(item) if in_section => {
                let item = item.trim();
                if !item.is_empty() {
                    includes.push(DocRef::from(item));
                }
            }
            Line::Key { .. } | Line::Other if in_section => break,
            _ => {}
        }
    }

    includes
}

/// Extract `includes` items from a whole document; empty if it has no
/// frontmatter block.
pub fn includes_of(text: &str) -> Vec<DocRef> {
    split_frontmatter(text)
        .map(|split| parse_includes(split.block))
        .unwrap_or_default()
}
