// SPDX-License-Identifier: MIT

//! Raw file operations: the untyped half of the Workspace contract.
//!
//! Every write creates parent directories and holds a lock scoped to the
//! target path for its entire duration; every public path goes through
//! [`crate::paths::resolve`] first.

use crate::error::WorkspaceError;
use crate::lock;
use crate::paths;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The durable, file-backed store shared by all four orchestration
/// components. Cloning is cheap (an `Arc`-free value holding only a root
/// path and a timeout); every store method reopens the file it needs.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    lock_timeout: Duration,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), lock_timeout: lock::DEFAULT_TIMEOUT }
    }

    pub fn with_lock_timeout(root: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        Self { root: root.into(), lock_timeout }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn resolve(&self, relative: &str) -> Result<PathBuf, WorkspaceError> {
        paths::resolve(&self.root, relative)
    }

    pub(crate) async fn lock(&self, target: &Path) -> Result<lock::LockGuard, WorkspaceError> {
        lock::acquire(target, self.lock_timeout).await
    }

    /// Read a UTF-8 text file. `NOT_FOUND` if it doesn't exist.
    pub async fn read_file(&self, relative: &str) -> Result<String, WorkspaceError> {
        let path = self.resolve(relative)?;
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WorkspaceError::NotFound(relative.to_string())
            } else {
                WorkspaceError::ReadFailed { path: path.display().to_string(), source: e }
            }
        })
    }

    /// Write `contents` to `relative`, creating parent directories and
    /// holding a lock scoped to the target path for the whole write.
    pub async fn write_file(&self, relative: &str, contents: &str) -> Result<(), WorkspaceError> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| WorkspaceError::WriteFailed {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        let _guard = self.lock(&path).await?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| WorkspaceError::WriteFailed { path: path.display().to_string(), source: e })
    }

    pub async fn file_exists(&self, relative: &str) -> Result<bool, WorkspaceError> {
        let path = self.resolve(relative)?;
        Ok(tokio::fs::try_exists(&path).await.unwrap_or(false))
    }

    pub async fn delete_file(&self, relative: &str) -> Result<(), WorkspaceError> {
        let path = self.resolve(relative)?;
        let _guard = self.lock(&path).await?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(WorkspaceError::NotFound(relative.to_string()))
            }
            Err(e) => Err(WorkspaceError::WriteFailed { path: path.display().to_string(), source: e }),
        }
    }

    /// List entries directly under `relative_dir` whose file name ends with
    /// `extension` (e.g. `.md`, `.json`), as paths relative to the workspace
    /// root, sorted lexicographically. An absent directory yields an empty
    /// list rather than an error.
    pub async fn list_files(
        &self,
        relative_dir: &str,
        extension: &str,
    ) -> Result<Vec<String>, WorkspaceError> {
        let dir = self.resolve(relative_dir)?;
        let mut entries = Vec::new();
        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => {
                return Err(WorkspaceError::ReadFailed { path: dir.display().to_string(), source: e })
            }
        };
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| WorkspaceError::ReadFailed { path: dir.display().to_string(), source: e })?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(extension) {
                entries.push(format!("{relative_dir}/{name}"));
            }
        }
        entries.sort();
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
