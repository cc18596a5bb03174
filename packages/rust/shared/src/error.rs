//! Error types for storygen.
//!
//! Library crates use [`StorygenError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for everything that is not a
//! terminal render failure.

use std::path::PathBuf;

/// Top-level error type for all storygen operations.
#[derive(Debug, thiserror::Error)]
pub enum StorygenError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The requested template does not exist under the templates root.
    #[error("Template not found: {}", .path.display())]
    TemplateNotFound { path: PathBuf },

    /// The working directory has no project main context document.
    #[error(
        "Project context not found: {}\n\n\
         You must have {main_ref} in your project directory.\n\
         Run from your project directory with an {main_ref} file.",
        .path.display()
    )]
    ProjectContextMissing { path: PathBuf, main_ref: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StorygenError>;

impl StorygenError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is one of the two terminal render failures that end
    /// a run with a plain user-facing message.
    pub fn is_fatal_render(&self) -> bool {
        matches!(
            self,
            Self::TemplateNotFound { .. } | Self::ProjectContextMissing { .. }
        )
    }

    /// Short machine-readable tag used in `error` log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Io { .. } => "io",
            Self::TemplateNotFound { .. } => "template_not_found",
            Self::ProjectContextMissing { .. } => "project_context_required",
        }
    }
}
