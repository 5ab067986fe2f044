// SPDX-License-Identifier: MIT

//! Workspace error taxonomy.
//!
//! Every variant exposes a stable `code()` so callers can switch on it
//! without matching the full enum.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("write failed for {path}: {source}")]
    WriteFailed { path: String, source: std::io::Error },

    #[error("read failed for {path}: {source}")]
    ReadFailed { path: String, source: std::io::Error },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("lock timeout acquiring {path} after {waited_ms} ms")]
    LockTimeout { path: String, waited_ms: u64 },

    #[error("parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("workspace not initialized at {0}")]
    WorkspaceNotInitialized(String),
}

impl WorkspaceError {
    /// The stable taxonomy code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            WorkspaceError::NotFound(_) => "NOT_FOUND",
            WorkspaceError::AlreadyExists(_) => "ALREADY_EXISTS",
            WorkspaceError::WriteFailed { .. } => "WRITE_FAILED",
            WorkspaceError::ReadFailed { .. } => "READ_FAILED",
            WorkspaceError::InvalidPath(_) => "INVALID_PATH",
            WorkspaceError::LockTimeout { .. } => "LOCK_TIMEOUT",
            WorkspaceError::ParseError { .. } => "PARSE_ERROR",
            WorkspaceError::ValidationError(_) => "VALIDATION_ERROR",
            WorkspaceError::WorkspaceNotInitialized(_) => "WORKSPACE_NOT_INITIALIZED",
        }
    }
}

impl From<mf_core::InvalidTransition> for WorkspaceError {
    fn from(e: mf_core::InvalidTransition) -> Self {
        WorkspaceError::ValidationError(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
