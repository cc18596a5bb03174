//! Include resolution.
//!
//! Each reference is looked up against a fixed list of candidate paths; the
//! first that exists is read, its frontmatter dropped, and its body appended
//! to the output followed by a blank line.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use storygen_markdown::strip_frontmatter;
use storygen_shared::{DocRef, EventLog, FileSystem, dedup_refs};

/// Separator appended after every included body.
pub const INCLUDE_SEPARATOR: &str = "\n\n";

/// Outcome of resolving a single reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Read from `path`; `body` is the frontmatter-stripped content.
    Resolved { path: PathBuf, body: String },
    /// No candidate path exists.
    Missing,
    /// The first existing candidate could not be read.
    Failed { path: PathBuf, error: String },
}

/// Concatenated include bodies plus per-reference bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct ResolvedIncludes {
    pub text: String,
    pub resolved: Vec<(DocRef, PathBuf)>,
    pub missing: Vec<DocRef>,
    pub failed: Vec<DocRef>,
}

/// Candidate paths for `reference`, in priority order:
/// 1. the reference under `base`
/// 2. the reference itself, if it is absolute
pub fn candidate_paths(base: &Path, reference: &DocRef) -> Vec<PathBuf> {
    let mut candidates = vec![base.join(reference.relative_part())];
    if reference.is_absolute() {
        let absolute = PathBuf::from(reference.as_str());
        if !candidates.contains(&absolute) {
            candidates.push(absolute);
        }
    }
    candidates
}

/// Resolve one reference. Only a non-existent candidate moves on to the
/// next one; a read failure ends resolution for this reference.
pub fn resolve_include(
    reference: &DocRef,
    base: &Path,
    fs: &dyn FileSystem,
    log: &dyn EventLog,
) -> Resolution {
    let Some(path) = candidate_paths(base, reference)
        .into_iter()
        .find(|p| fs.exists(p))
    else {
        log.warn(&format!("Include file not found: {reference}"));
        log.record(
            "include",
            &[("file", reference.to_string()), ("status", "missing".into())],
        );
        return Resolution::Missing;
    };

    match fs.read_to_string(&path) {
        Ok(content) => {
            debug!(%reference, path = %path.display(), "include resolved");
            log.record(
                "include",
                &[
                    ("file", reference.to_string()),
                    ("resolved", path.display().to_string()),
                    ("status", "ok".into()),
                ],
            );
            Resolution::Resolved {
                body: strip_frontmatter(&content).to_string(),
                path,
            }
        }
        Err(e) => {
            let error = e.to_string();
            log.warn(&format!("Error reading include {}: {error}", path.display()));
            log.record(
                "include",
                &[
                    ("file", reference.to_string()),
                    ("resolved", path.display().to_string()),
                    ("status", "error".into()),
                    ("error", error.clone()),
                ],
            );
            Resolution::Failed { path, error }
        }
    }
}

/// Resolve every reference in order and concatenate the bodies. Repeated
/// references are emitted once, at their first position.
#[instrument(skip_all, fields(count = refs.len(), base = %base.display()))]
pub fn resolve_includes(
    refs: &[DocRef],
    base: &Path,
    fs: &dyn FileSystem,
    log: &dyn EventLog,
) -> ResolvedIncludes {
    let mut out = ResolvedIncludes::default();

    for reference in dedup_refs(refs) {
        match resolve_include(&reference, base, fs, log) {
            Resolution::Resolved { path, body } => {
                out.text.push_str(&body);
                out.text.push_str(INCLUDE_SEPARATOR);
                out.resolved.push((reference, path));
            }
            Resolution::Missing => out.missing.push(reference),
            Resolution::Failed { .. } => out.failed.push(reference),
        }
    }

    debug!(
        resolved = out.resolved.len(),
        missing = out.missing.len(),
        failed = out.failed.len(),
        "includes resolved"
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use storygen_shared::{MemoryEventLog, MemoryFileSystem};

    fn refs(items: &[&str]) -> Vec<DocRef> {
        items.iter().map(|s| DocRef::from(*s)).collect()
    }

    #[test]
    fn candidates_for_relative_and_absolute() {
        let base = Path::new("/work");
        assert_eq!(
            candidate_paths(base, &"inc/a.md".into()),
            vec![PathBuf::from("/work/inc/a.md")]
        );
        assert_eq!(
            candidate_paths(base, &"/opt/style.md".into()),
            vec![PathBuf::from("/work/opt/style.md"), PathBuf::from("/opt/style.md")]
        );
    }

    #[test]
    fn concatenates_bodies_with_blank_line() {
        let fs = MemoryFileSystem::new()
            .with_file("/work/inc/a.md", "Alpha")
            .with_file("/work/inc/b.md", "Beta\n");
        let log = MemoryEventLog::new();

        let out = resolve_includes(&refs(&["inc/a.md", "inc/b.md"]), Path::new("/work"), &fs, &log);

        assert_eq!(out.text, "Alpha\n\nBeta\n\n\n");
        assert_eq!(out.resolved.len(), 2);
        assert_eq!(log.named("include").len(), 2);
    }

    #[test]
    fn included_frontmatter_is_never_emitted() {
        let fs = MemoryFileSystem::new().with_file(
            "/work/inc/steg.md",
            "---\naliases:\n  - execon\n---\n# Steg\n",
        );

        let out = resolve_includes(&refs(&["inc/steg.md"]), Path::new("/work"), &fs, &MemoryEventLog::new());

        assert_eq!(out.text, "# Steg\n\n\n");
        assert!(!out.text.contains("aliases"));
    }

    #[test]
    fn project_path_wins_over_absolute() {
        let fs = MemoryFileSystem::new()
            .with_file("/work/opt/style.md", "project copy")
            .with_file("/opt/style.md", "absolute copy");

        let out = resolve_includes(&refs(&["/opt/style.md"]), Path::new("/work"), &fs, &MemoryEventLog::new());
        assert_eq!(out.text, "project copy\n\n");
    }

    #[test]
    fn absolute_fallback() {
        let fs = MemoryFileSystem::new().with_file("/opt/style.md", "absolute copy");

        let out = resolve_includes(&refs(&["/opt/style.md"]), Path::new("/work"), &fs, &MemoryEventLog::new());

        assert_eq!(out.text, "absolute copy\n\n");
        assert_eq!(out.resolved[0].1, PathBuf::from("/opt/style.md"));
    }

    #[test]
    fn missing_include_warns_and_contributes_nothing() {
        let fs = MemoryFileSystem::new().with_file("/work/inc/a.md", "Alpha");
        let log = MemoryEventLog::new();

        let out = resolve_includes(&refs(&["inc/ghost.md", "inc/a.md"]), Path::new("/work"), &fs, &log);

        assert_eq!(out.text, "Alpha\n\n");
        assert_eq!(strs(&out.missing), ["inc/ghost.md"]);
        assert_eq!(log.warnings(), vec!["Include file not found: inc/ghost.md"]);
    }

    #[test]
    fn read_error_does_not_fall_back() {
        let mut fs = MemoryFileSystem::new().with_file("/opt/style.md", "absolute copy");
        fs.mark_unreadable("/work/opt/style.md");
        let log = MemoryEventLog::new();

        let resolution = resolve_include(&"/opt/style.md".into(), Path::new("/work"), &fs, &log);

        assert!(matches!(
            resolution,
            Resolution::Failed { ref path, .. } if path == Path::new("/work/opt/style.md")
        ));
        assert_eq!(log.warnings().len(), 1);
        assert_eq!(log.named("include")[0].field("status"), Some("error"));
    }

    #[test]
    fn duplicates_emit_once() {
        let fs = MemoryFileSystem::new()
            .with_file("/work/a.md", "A")
            .with_file("/work/b.md", "B");
        let base = Path::new("/work");

        let with_dupes = resolve_includes(&refs(&["a.md", "b.md", "a.md", "b.md"]), base, &fs, &MemoryEventLog::new());
        let without = resolve_includes(&refs(&["a.md", "b.md"]), base, &fs, &MemoryEventLog::new());

        assert_eq!(with_dupes.text, without.text);
        assert_eq!(with_dupes.text, "A\n\nB\n\n");
    }

    fn strs(refs: &[DocRef]) -> Vec<&str> {
        refs.iter().map(DocRef::as_str).collect()
    }
}
