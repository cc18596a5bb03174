//! Concept index builder.
//!
//! Scans the project include directory and maps every concept key (file
//! basename or declared alias) to the document that describes it.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use storygen_markdown::parse_frontmatter;
use storygen_shared::{DocRef, EventLog, FileSystem, ProjectLayout};

/// Frontmatter list declaring extra lookup keys for a concept document.
pub const ALIASES_FIELD: &str = "aliases";

/// Concept key → document reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConceptIndex {
    entries: BTreeMap<String, DocRef>,
}

impl ConceptIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key`, replacing any earlier target. Returns the replaced
    /// target.
    pub fn insert(&mut self, key: impl Into<String>, doc: DocRef) -> Option<DocRef> {
        self.entries.insert(key.into(), doc)
    }

    pub fn get(&self, key: &str) -> Option<&DocRef> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DocRef)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Build the concept index from `<root>/<include_dir>`.
///
/// A missing directory gives an empty index. The project main file is never
/// a concept. Files are visited in name order and later keys overwrite
/// earlier ones; each overwrite is recorded as a `concept_collision` event.
/// A file that cannot be read still gets its basename key, only its aliases
/// are lost.
#[instrument(skip_all, fields(dir = %layout.include_path().display()))]
pub fn build_concept_index(
    layout: &ProjectLayout,
    fs: &dyn FileSystem,
    log: &dyn EventLog,
) -> ConceptIndex {
    let mut index = ConceptIndex::new();
    let dir = layout.include_path();

    if !fs.exists(&dir) {
        debug!("no include directory, concept matching disabled");
        log.record("concept_index", &[("status", "no_inc_dir".into())]);
        return index;
    }

    let names = match fs.list_dir(&dir) {
        Ok(names) => names,
        Err(e) => {
            log.warn(&format!("Error listing concept directory: {e}"));
            return index;
        }
    };

    let suffix = format!(".{}", layout.extension);
    let files: Vec<&String> = names
        .iter()
        .filter(|name| name.ends_with(&suffix) && **name != layout.main_file)
        .collect();

    for file in &files {
        let basename = &file[..file.len() - suffix.len()];
        let doc = layout.doc_ref(file);
        register(&mut index, basename, &doc, log);

        match fs.read_to_string(&dir.join(file.as_str())) {
            Ok(content) => {
                let frontmatter = parse_frontmatter(&content);
                for alias in frontmatter.list(ALIASES_FIELD).unwrap_or_default() {
                    register(&mut index, alias, &doc, log);
                }
            }
            Err(e) => log.warn(&format!("Error parsing frontmatter in {file}: {e}")),
        }
    }

    debug!(files = files.len(), entries = index.len(), "concept index built");
    log.record(
        "concept_index",
        &[
            ("status", "built".into()),
            ("files", files.len().to_string()),
            ("entries", index.len().to_string()),
        ],
    );

    index
}

fn register(index: &mut ConceptIndex, key: &str, doc: &DocRef, log: &dyn EventLog) {
    if let Some(previous) = index.insert(key, doc.clone()) {
        if previous != *doc {
            debug!(key, %previous, replaced_by = %doc, "concept key collision");
            log.record(
                "concept_collision",
                &[
                    ("key", key.to_string()),
                    ("previous", previous.to_string()),
                    ("replaced_by", doc.to_string()),
                ],
            );
        }
    }
}
