//! Core domain types for storygen renders.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

// ---------------------------------------------------------------------------
// DocRef
// ---------------------------------------------------------------------------

/// A document reference: an opaque path string, relative to the project
/// directory (e.g. `inc/steg.md`) or absolute.
///
/// Two references are the same include only if their strings are equal;
/// no path normalization happens before deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DocRef(String);

impl DocRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the reference is syntactically an absolute path.
    pub fn is_absolute(&self) -> bool {
        Path::new(&self.0).is_absolute()
    }

    /// The reference with any root or prefix removed, so it can be joined
    /// under a base directory.
    pub fn relative_part(&self) -> PathBuf {
        Path::new(&self.0)
            .components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
            .collect()
    }
}

impl std::fmt::Display for DocRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for DocRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Keep the first occurrence of every reference, preserving order.
pub fn dedup_refs<'a>(refs: impl IntoIterator<Item = &'a DocRef>) -> Vec<DocRef> {
    let mut seen = HashSet::new();
    refs.into_iter()
        .filter(|r| seen.insert(r.as_str()))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Include list
// ---------------------------------------------------------------------------

/// Where an include reference came from. Variants are declared in
/// precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncludeSource {
    /// `includes` declared in the project main context document.
    ProjectMainIncludes,
    /// The project main context document itself.
    ProjectMain,
    /// A concept document matched from the user prompt.
    ConceptMatch,
    /// A concept declared as related by a matched concept document.
    RelatedConcept,
    /// `includes` declared in the template's own frontmatter.
    TemplateInclude,
}

impl std::fmt::Display for IncludeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ProjectMainIncludes => "project_main_includes",
            Self::ProjectMain => "project_main",
            Self::ConceptMatch => "concept_match",
            Self::RelatedConcept => "related_concept",
            Self::TemplateInclude => "template_include",
        };
        f.write_str(s)
    }
}

/// A reference tagged with the segment it was merged from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedRef {
    pub source: IncludeSource,
    pub reference: DocRef,
}

/// The merged include list of a single render, before deduplication.
///
/// Segments must be pushed in [`IncludeSource`] order; pushing a segment
/// that ranks below the last one is a logic error.
#[derive(Debug, Clone, Default)]
pub struct IncludeList {
    entries: Vec<TaggedRef>,
}

impl IncludeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a whole segment.
    pub fn push_segment(&mut self, source: IncludeSource, refs: impl IntoIterator<Item = DocRef>) {
        debug_assert!(
            self.entries.last().is_none_or(|last| last.source <= source),
            "include segment {source} pushed out of precedence order"
        );
        self.entries.extend(refs.into_iter().map(|reference| TaggedRef {
            source,
            reference,
        }));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TaggedRef] {
        &self.entries
    }

    /// Single pass keeping the first occurrence of each reference string.
    pub fn dedup(&self) -> Vec<TaggedRef> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|e| seen.insert(e.reference.as_str()))
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ProjectLayout
// ---------------------------------------------------------------------------

/// Where the project context lives for a render.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Project root (normally the current directory).
    pub root: PathBuf,
    /// Include/concept directory name, relative to `root`.
    pub include_dir: String,
    /// Project main context file name inside `include_dir`.
    pub main_file: String,
    /// Document extension recognized in the include directory (no dot).
    pub extension: String,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_dir: "inc".into(),
            main_file: "main.md".into(),
            extension: "md".into(),
        }
    }

    /// Absolute path of the include directory.
    pub fn include_path(&self) -> PathBuf {
        self.root.join(&self.include_dir)
    }

    /// Absolute path of the project main context document.
    pub fn main_path(&self) -> PathBuf {
        self.include_path().join(&self.main_file)
    }

    /// Reference string of the project main context (`inc/main.md`).
    pub fn main_ref(&self) -> DocRef {
        self.doc_ref(&self.main_file)
    }

    /// Reference string of a file inside the include directory.
    pub fn doc_ref(&self, file_name: &str) -> DocRef {
        DocRef::new(format!("{}/{file_name}", self.include_dir))
    }
}
