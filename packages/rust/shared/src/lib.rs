//! Shared types, error model, configuration and capabilities for storygen.
//!
//! This crate is the foundation depended on by all other storygen crates.
//! It provides:
//! - [`StorygenError`] — the unified error type
//! - Domain types ([`DocRef`], [`IncludeList`], [`ProjectLayout`])
//! - Configuration ([`AppConfig`], config loading)
//! - The [`FileSystem`] and [`EventLog`] capabilities injected into the core

pub mod config;
pub mod error;
pub mod fs;
pub mod log;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, PathsConfig, RenderConfig, config_dir, config_file_path, expand_home, init_config,
    load_config, load_config_from,
};
pub use error::{Result, StorygenError};
pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use log::{EventLog, Field, FileEventLog, LoggedEvent, MemoryEventLog, NullEventLog, json_list};
pub use types::{DocRef, IncludeList, IncludeSource, ProjectLayout, TaggedRef, dedup_refs};
