//! Frontmatter field parser.
//!
//! Supports the small dialect storygen documents use: `key: value` scalars
//! and `key:` followed by `- item` lines for lists. Anything else inside the
//! block is ignored; the parser never fails.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::split_frontmatter;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A frontmatter field value: either a scalar or an ordered list, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

/// Parsed frontmatter fields, keyed by field name as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    fields: BTreeMap<String, FieldValue>,
}

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// The scalar value of `key`, if it is a scalar field.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        match self.fields.get(key)? {
            FieldValue::Scalar(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    /// The items of `key`, if it is a list field.
    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.fields.get(key)? {
            FieldValue::List(items) => Some(items),
            FieldValue::Scalar(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

/// Matches `key: value` at column 0. Keys are letters and underscores.
static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_]+):\s*(.*)$").expect("key regex"));

/// Matches `- item`, with optional leading whitespace.
static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s+(.+)$").expect("item regex"));

/// What a single block line means to the scanner.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    /// `- item`; the captured text is untrimmed.
    Item(&'a str),
    /// `key: value`; an empty value opens a list.
    Key { key: &'a str, value: &'a str },
    /// Starts with non-whitespace but is neither a key nor an item.
    Other,
    /// Blank or indented non-item line.
    Blank,
}

pub(crate) fn classify(line: &str) -> Line<'_> {
    if let Some(item) = ITEM_RE.captures(line).and_then(|caps| caps.get(1)) {
        return Line::Item(item.as_str());
    }
    if let Some(caps) = KEY_RE.captures(line) {
        return Line::Key {
            key: caps.get(1).map_or("", |m| m.as_str()),
            value: caps.get(2).map_or("", |m| m.as_str().trim()),
        };
    }
    match line.chars().next() {
        Some(c) if !c.is_whitespace() => Line::Other,
        _ => Line::Blank,
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Scanner state inside the block. Outside the block is handled by
/// [`split_frontmatter`].
enum State {
    /// Waiting for a `key:` line; stray items are ignored.
    AwaitingKey,
    /// Accumulating items of the named list field.
    InList(String),
}

/// Parse the frontmatter of a whole document. Documents without a
/// frontmatter block yield an empty [`Frontmatter`].
pub fn parse_frontmatter(text: &str) -> Frontmatter {
    split_frontmatter(text)
        .map(|split| parse_block(split.block))
        .unwrap_or_default()
}

/// Parse the lines between the delimiters.
pub fn parse_block(block: &str) -> Frontmatter {
    let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();
    let mut state = State::AwaitingKey;

    for line in block.lines() {
        match classify(line) {
            Line::Key { key, value } => {
                if value.is_empty() {
                    fields.insert(key.to_string(), FieldValue::List(Vec::new()));
                    state = State::InList(key.to_string());
                } else {
                    fields.insert(key.to_string(), FieldValue::Scalar(value.to_string()));
                    state = State::AwaitingKey;
                }
            }
            Line::Item(item) => {
                let State::InList(key) = &state else {
                    continue;
                };
                let item = item.trim();
                if item.is_empty() {
                    continue;
                }
                if let Some(FieldValue::List(items)) = fields.get_mut(key) {
                    items.push(item.to_string());
                }
            }
            Line::Other => state = State::AwaitingKey,
            Line::Blank => {}
        }
    }

    Frontmatter { fields }
}
