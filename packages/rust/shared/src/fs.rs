//! File-access capability injected into the render components.
//!
//! Components never touch `std::fs` directly; they go through
//! [`FileSystem`], so tests can run against [`MemoryFileSystem`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::error::{Result, StorygenError};

/// The three file operations a render needs.
pub trait FileSystem {
    /// Whether a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Read a whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Names of the regular files directly inside `dir`, sorted. Symlinks
    /// count when their target is a regular file.
    fn list_dir(&self, dir: &Path) -> Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// OsFileSystem
// ---------------------------------------------------------------------------

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| StorygenError::io(path, e))
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<String>> {
        let read_dir = std::fs::read_dir(dir).map_err(|e| StorygenError::io(dir, e))?;

        let mut names = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| StorygenError::io(dir, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| StorygenError::io(entry.path(), e))?;
            if file_type.is_file() || (file_type.is_symlink() && entry.path().is_file()) {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

// ---------------------------------------------------------------------------
// MemoryFileSystem
// ---------------------------------------------------------------------------

/// In-memory filesystem for deterministic tests.
///
/// Directories exist implicitly as ancestors of stored files. Paths marked
/// unreadable exist but fail on read.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: BTreeMap<PathBuf, String>,
    unreadable: BTreeSet<PathBuf>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    /// Make an existing (or new, empty) file fail on read.
    pub fn mark_unreadable(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.files.entry(path.clone()).or_default();
        self.unreadable.insert(path);
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.files.keys().any(|f| f.starts_with(path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        if self.unreadable.contains(path) {
            return Err(StorygenError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
            ));
        }
        self.files.get(path).cloned().ok_or_else(|| {
            StorygenError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            )
        })
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<String>> {
        if !self.exists(dir) {
            return Err(StorygenError::io(
                dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
            ));
        }
        // BTreeMap iteration is already sorted by path.
        Ok(self
            .files
            .keys()
            .filter(|f| f.parent() == Some(dir))
            .filter_map(|f| f.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }
}
