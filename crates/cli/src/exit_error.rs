// SPDX-License-Identifier: MIT

//! Carries a process exit code alongside its message: commands return
//! `ExitError` instead of calling `std::process::exit()` directly, so
//! `main()` stays a thin shim that does the actual exiting.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Every non-zero exit in this CLI is code 1: configuration error,
    /// invalid arguments, or goal/pipeline failure.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(1, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
