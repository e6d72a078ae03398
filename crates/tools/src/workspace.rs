//! Workspace confinement for tools that write files.
//!
//! Model-supplied paths are resolved lexically against the workspace root;
//! anything that would land outside it (absolute paths, `..` climbing above
//! the root, drive prefixes) is refused before the filesystem is touched.
//! After parent directories are created, the real location is checked again
//! so a symlink inside the workspace cannot redirect a write elsewhere.

use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkspaceError {
    #[error("path escapes workspace")]
    Escapes,

    #[error("path is empty")]
    Empty,

    #[error("filesystem error: {0}")]
    Io(String),
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `relative` to a path under the root, without touching disk.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, WorkspaceError> {
        let relative = relative.trim();
        if relative.is_empty() {
            return Err(WorkspaceError::Empty);
        }

        let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => parts.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(WorkspaceError::Escapes);
                    }
                }
                Component::RootDir | Component::Prefix(_) => return Err(WorkspaceError::Escapes),
            }
        }
        if parts.is_empty() {
            return Err(WorkspaceError::Empty);
        }

        Ok(parts.iter().fold(self.root.clone(), |acc, p| acc.join(p)))
    }

    /// Create the parent directories of `full` and confirm that, once
    /// symlinks are resolved, it still sits under the root.
    pub async fn prepare(&self, full: &Path) -> Result<(), WorkspaceError> {
        let parent = full.parent().unwrap_or(&self.root);
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;

        let root = tokio::fs::canonicalize(&self.root)
            .await
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;
        let parent = tokio::fs::canonicalize(parent)
            .await
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;
        if !parent.starts_with(&root) {
            return Err(WorkspaceError::Escapes);
        }
        Ok(())
    }

    /// `full` relative to the root, with forward slashes.
    pub fn display_relative(&self, full: &Path) -> String {
        full.strip_prefix(&self.root)
            .unwrap_or(full)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
