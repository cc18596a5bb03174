//! Prompt → concept document matching.
//!
//! The prompt is tokenized, tokens are looked up in the [`ConceptIndex`],
//! and each matched document's `related_concepts` are followed exactly one
//! hop.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use storygen_markdown::parse_frontmatter;
use storygen_shared::{DocRef, EventLog, FileSystem, dedup_refs, json_list};

use crate::concepts::ConceptIndex;

/// Frontmatter list naming concepts to pull in alongside a matched one.
pub const RELATED_CONCEPTS_FIELD: &str = "related_concepts";

/// Token separators: whitespace and `, . ( ) ? ! ; : "`. Hyphens and
/// underscores stay inside tokens.
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\s,.()?!;:"]+"#).expect("separator regex"));

/// Concept documents found for a prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConceptMatches {
    /// Documents matched directly by prompt tokens, in first-match order,
    /// without repeats.
    pub direct: Vec<DocRef>,
    /// Documents declared as related by the direct matches, in expansion
    /// order. May repeat entries of `direct`; deduplication happens when the
    /// include list is merged.
    pub related: Vec<DocRef>,
}

/// Lower-case the prompt and split it into non-empty tokens.
pub fn extract_concept_tokens(prompt: &str) -> Vec<String> {
    SEPARATOR_RE
        .split(&prompt.to_lowercase())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Documents whose concept keys appear among the prompt tokens.
pub fn find_concept_files(prompt: &str, index: &ConceptIndex, log: &dyn EventLog) -> Vec<DocRef> {
    let tokens = extract_concept_tokens(prompt);
    log.record(
        "concept_extraction",
        &[
            ("tokens", json_list(&tokens)),
            ("source", "user_prompt".into()),
        ],
    );

    let hits: Vec<&DocRef> = tokens.iter().filter_map(|t| index.get(t)).collect();
    let matched = dedup_refs(hits);

    if !matched.is_empty() {
        debug!(count = matched.len(), "concepts matched");
        log.record(
            "concept_matching",
            &[("matches", json_list(&matched)), ("status", "ok".into())],
        );
    }

    matched
}

/// Resolve the `related_concepts` of one concept document through the index.
///
/// Entries that are not index keys are dropped. A document that does not
/// exist yields nothing; one that cannot be read yields nothing plus a
/// warning.
pub fn load_related_concepts(
    concept: &DocRef,
    index: &ConceptIndex,
    root: &Path,
    fs: &dyn FileSystem,
    log: &dyn EventLog,
) -> Vec<DocRef> {
    let path = root.join(concept.relative_part());
    if !fs.exists(&path) {
        return Vec::new();
    }

    let content = match fs.read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            log.warn(&format!("Error loading related concepts from {concept}: {e}"));
            return Vec::new();
        }
    };

    let frontmatter = parse_frontmatter(&content);
    let related: Vec<DocRef> = frontmatter
        .list(RELATED_CONCEPTS_FIELD)
        .unwrap_or_default()
        .iter()
        .filter_map(|name| index.get(name).cloned())
        .collect();

    if !related.is_empty() {
        log.record(
            "related_concepts",
            &[("from", concept.to_string()), ("loaded", json_list(&related))],
        );
    }

    related
}

/// Match the prompt and expand the matches by one related-concept hop.
#[instrument(skip_all, fields(index_entries = index.len()))]
pub fn match_concepts(
    prompt: &str,
    index: &ConceptIndex,
    root: &Path,
    fs: &dyn FileSystem,
    log: &dyn EventLog,
) -> ConceptMatches {
    let direct = find_concept_files(prompt, index, log);
    let related = direct
        .iter()
        .flat_map(|concept| load_related_concepts(concept, index, root, fs, log))
        .collect();

    ConceptMatches { direct, related }
}
