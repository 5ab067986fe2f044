// SPDX-License-Identifier: MIT

//! Pipeline error taxonomy. `PipelineResult.error` carries one of
//! these; `code()` gives each a stable string.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("step failed: {0}")]
    StepFailed(String),
    #[error("pipeline definition has no steps")]
    NoSteps,
    #[error("invalid step index: {0}")]
    InvalidStepIndex(usize),
    #[error("task creation failed: {0}")]
    TaskCreationFailed(String),
    #[error("workspace error: {0}")]
    WorkspaceError(String),
    #[error("aborted")]
    Aborted,
    #[error("pipeline already running")]
    AlreadyRunning,
    #[error("paused for review")]
    PausedForReview,
    #[error("unknown pipeline error: {0}")]
    Unknown(String),
}

impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::StepFailed(_) => "STEP_FAILED",
            PipelineError::NoSteps => "NO_STEPS",
            PipelineError::InvalidStepIndex(_) => "INVALID_STEP_INDEX",
            PipelineError::TaskCreationFailed(_) => "TASK_CREATION_FAILED",
            PipelineError::WorkspaceError(_) => "WORKSPACE_ERROR",
            PipelineError::Aborted => "ABORTED",
            PipelineError::AlreadyRunning => "ALREADY_RUNNING",
            PipelineError::PausedForReview => "PAUSED_FOR_REVIEW",
            PipelineError::Unknown(_) => "UNKNOWN",
        }
    }
}
