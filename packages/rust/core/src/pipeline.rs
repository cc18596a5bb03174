//! End-to-end render: template → project context → concepts → includes → document.

use std::path::PathBuf;

use tracing::{debug, info, instrument};

use storygen_markdown::{includes_of, parse_includes, split_frontmatter};
use storygen_shared::{
    DocRef, EventLog, FileSystem, IncludeList, IncludeSource, ProjectLayout, Result,
    StorygenError, TaggedRef, json_list,
};

use crate::concepts::build_concept_index;
use crate::matcher::match_concepts;
use crate::resolver::resolve_includes;

/// Where templates and project context come from.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Directory holding `<template-name>.<ext>` files.
    pub templates_dir: PathBuf,
    /// Project context layout.
    pub layout: ProjectLayout,
    /// Heading line introducing the user request block.
    pub user_request_heading: String,
}

/// A single render invocation.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Template name, without extension.
    pub template: String,
    /// Free-text user prompt; empty when none was given.
    pub prompt: String,
}

/// Result of a successful render.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// The rendered document.
    pub document: String,
    /// Final include order after deduplication, tagged with each entry's source.
    pub includes: Vec<TaggedRef>,
    /// References that were read and emitted.
    pub resolved: Vec<DocRef>,
    /// References with no existing candidate path.
    pub missing: Vec<DocRef>,
    /// References whose file existed but could not be read.
    pub failed: Vec<DocRef>,
}

/// Render progress. A run that returns `Ok` has passed through every stage
/// in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    TemplateLoaded,
    ProjectContextValidated,
    ConceptsIndexed,
    IncludesMerged,
    IncludesResolved,
    Rendered,
}

fn enter(stage: Stage) {
    debug!(?stage, "render stage");
}

/// Record a terminal render failure as an `error` event and hand it back.
fn fatal(log: &dyn EventLog, err: StorygenError) -> StorygenError {
    let path = match &err {
        StorygenError::TemplateNotFound { path }
        | StorygenError::ProjectContextMissing { path, .. }
        | StorygenError::Io { path, .. } => path.display().to_string(),
        StorygenError::Config { .. } => String::new(),
    };
    log.record("error", &[("type", err.kind().into()), ("path", path)]);
    err
}

/// Append the user request block introduced by `heading`.
fn push_user_request(document: &mut String, heading: &str, prompt: &str) {
    if prompt.trim().is_empty() {
        return;
    }
    document.push_str("\n\n");
    document.push_str(heading);
    document.push_str("\n\n");
    document.push_str(prompt);
    document.push('\n');
}

/// Run a full render.
///
/// Include order before deduplication:
/// 1. `includes` of the project main context document
/// 2. the project main context document
/// 3. concept documents matched from the prompt
/// 4. their related concepts (one hop)
/// 5. `includes` of the template
///
/// The only errors are a missing template, a missing project main context,
/// or an I/O failure reading either of them. Everything else degrades to a
/// warning on `log`.
#[instrument(skip_all, fields(template = %request.template))]
pub fn render(
    options: &RenderOptions,
    request: &RenderRequest,
    fs: &dyn FileSystem,
    log: &dyn EventLog,
) -> Result<RenderOutput> {
    let layout = &options.layout;
    enter(Stage::Start);

    // --- Template ---
    let template_path = options
        .templates_dir
        .join(format!("{}.{}", request.template, layout.extension));
    if !fs.exists(&template_path) {
        return Err(fatal(
            log,
            StorygenError::TemplateNotFound {
                path: template_path,
            },
        ));
    }

    let template = fs.read_to_string(&template_path)?;
    log.record(
        "template",
        &[
            ("file", template_path.display().to_string()),
            ("status", "ok".into()),
        ],
    );
    let (template_block, template_body) = match split_frontmatter(&template) {
        Some(split) => (Some(split.block), split.body),
        None => (None, template.as_str()),
    };
    enter(Stage::TemplateLoaded);

    // --- Project context ---
    let main_path = layout.main_path();
    if !fs.exists(&main_path) {
        return Err(fatal(
            log,
            StorygenError::ProjectContextMissing {
                path: main_path,
                main_ref: layout.main_ref().to_string(),
            },
        ));
    }

    let main_content = fs.read_to_string(&main_path)?;
    let main_includes = includes_of(&main_content);
    if split_frontmatter(&main_content).is_some() {
        log.record(
            "project_main_includes",
            &[
                ("count", main_includes.len().to_string()),
                ("files", json_list(&main_includes)),
            ],
        );
    }
    enter(Stage::ProjectContextValidated);

    // --- Concepts ---
    let index = build_concept_index(layout, fs, log);
    let concepts = match_concepts(&request.prompt, &index, &layout.root, fs, log);
    enter(Stage::ConceptsIndexed);

    // --- Merge ---
    let template_includes = template_block.map(parse_includes).unwrap_or_default();

    let mut list = IncludeList::new();
    list.push_segment(IncludeSource::ProjectMainIncludes, main_includes);
    list.push_segment(IncludeSource::ProjectMain, [layout.main_ref()]);
    list.push_segment(IncludeSource::ConceptMatch, concepts.direct);
    list.push_segment(IncludeSource::RelatedConcept, concepts.related);
    list.push_segment(IncludeSource::TemplateInclude, template_includes);

    let includes = list.dedup();
    let refs: Vec<DocRef> = includes.iter().map(|e| e.reference.clone()).collect();
    log.record(
        "includes_final",
        &[
            ("total", refs.len().to_string()),
            ("files", json_list(&refs)),
        ],
    );
    enter(Stage::IncludesMerged);

    // --- Resolve ---
    let resolved = resolve_includes(&refs, &layout.root, fs, log);
    enter(Stage::IncludesResolved);

    // --- Compose ---
    let mut document = resolved.text;
    document.push_str(template_body);
    push_user_request(&mut document, &options.user_request_heading, &request.prompt);
    enter(Stage::Rendered);

    info!(
        includes = includes.len(),
        missing = resolved.missing.len(),
        bytes = document.len(),
        "render complete"
    );

    Ok(RenderOutput {
        document,
        includes,
        resolved: resolved.resolved.into_iter().map(|(r, _)| r).collect(),
        missing: resolved.missing,
        failed: resolved.failed,
    })
}
