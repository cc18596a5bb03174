//! Core render pipeline for storygen.
//!
//! This crate ties together the concept index, prompt matching and include
//! resolution into a single render (`pipeline::render`).

pub mod concepts;
pub mod matcher;
pub mod pipeline;
pub mod resolver;

pub use concepts::{ConceptIndex, build_concept_index};
pub use matcher::{ConceptMatches, extract_concept_tokens, match_concepts};
pub use pipeline::{RenderOptions, RenderOutput, RenderRequest, Stage, render};
pub use resolver::{Resolution, ResolvedIncludes, resolve_includes};
