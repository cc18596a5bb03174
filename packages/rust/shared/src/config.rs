//! Application configuration for storygen.
//!
//! User config lives at `~/.storygen/storygen.toml`.
//! CLI flags override environment, which overrides the config file, which
//! overrides defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorygenError};
use crate::types::ProjectLayout;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "storygen.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".storygen";

// ---------------------------------------------------------------------------
// Config structs (matching storygen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Template and project paths.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Output composition.
    #[serde(default)]
    pub render: RenderConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding `<template-name>.md` files. A leading `~` is
    /// expanded to the home directory.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,

    /// Project include/concept directory, relative to the project root.
    #[serde(default = "default_include_dir")]
    pub include_dir: String,

    /// Project main context file inside the include directory.
    #[serde(default = "default_main_file")]
    pub main_file: String,

    /// Document extension recognized in the include directory.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Event log file, relative to the project root.
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            include_dir: default_include_dir(),
            main_file: default_main_file(),
            extension: default_extension(),
            log_file: default_log_file(),
        }
    }
}

fn default_templates_dir() -> String {
    "~/.storygen/tpl".into()
}
fn default_include_dir() -> String {
    "inc".into()
}
fn default_main_file() -> String {
    "main.md".into()
}
fn default_extension() -> String {
    "md".into()
}
fn default_log_file() -> String {
    "storygen.log".into()
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Heading line introducing the user's literal request text.
    #[serde(default = "default_user_request_heading")]
    pub user_request_heading: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            user_request_heading: default_user_request_heading(),
        }
    }
}

fn default_user_request_heading() -> String {
    "## User Request".into()
}

impl PathsConfig {
    /// Project layout rooted at `root`, using the configured names.
    pub fn layout(&self, root: impl Into<PathBuf>) -> ProjectLayout {
        ProjectLayout {
            root: root.into(),
            include_dir: self.include_dir.clone(),
            main_file: self.main_file.clone(),
            extension: self.extension.clone(),
        }
    }

    /// The templates directory with `~` expanded.
    pub fn templates_path(&self) -> Result<PathBuf> {
        expand_home(&self.templates_dir)
    }
}

/// Expand a leading `~` or `~/` to the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return Ok(PathBuf::from(path)),
    };
    let home = dirs::home_dir()
        .ok_or_else(|| StorygenError::config("could not determine home directory"))?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.storygen/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| StorygenError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.storygen/storygen.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| StorygenError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| StorygenError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| StorygenError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| StorygenError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| StorygenError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("templates_dir"));
        assert!(toml_str.contains("## User Request"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.paths.include_dir, "inc");
        assert_eq!(parsed.paths.main_file, "main.md");
        assert_eq!(parsed.paths.log_file, "storygen.log");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[paths]
templates_dir = "/srv/storygen/tpl"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.paths.templates_dir, "/srv/storygen/tpl");
        assert_eq!(config.paths.extension, "md");
        assert_eq!(config.render.user_request_heading, "## User Request");
    }

    #[test]
    fn layout_from_paths() {
        let paths = PathsConfig {
            include_dir: "context".into(),
            ..PathsConfig::default()
        };
        let layout = paths.layout("/work");
        assert_eq!(layout.main_path(), PathBuf::from("/work/context/main.md"));
        assert_eq!(layout.main_ref().as_str(), "context/main.md");
    }

    #[test]
    fn home_expansion() {
        assert_eq!(expand_home("/abs/tpl").unwrap(), PathBuf::from("/abs/tpl"));
        assert_eq!(expand_home("~other/tpl").unwrap(), PathBuf::from("~other/tpl"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/tpl").unwrap(), home.join("tpl"));
            assert_eq!(expand_home("~").unwrap(), home);
        }
    }

    #[test]
    fn load_config_from_invalid_toml_fails() {
        let path = std::env::temp_dir().join(format!("sg-config-test-{}.toml", uuid::Uuid::now_v7()));
        std::fs::write(&path, "[paths\ntemplates_dir = ").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().starts_with("config error: failed to parse"));
        std::fs::remove_file(&path).ok();
    }
}
