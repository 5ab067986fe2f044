// SPDX-License-Identifier: MIT

//! The abstract LLM message client and the Execution error taxonomy
//! it raises.

use async_trait::async_trait;
use mf_core::CancelToken;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_message: String,
    pub model: String,
    pub max_tokens: u32,
    pub cancel: Option<CancelToken>,
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub stop_reason: StopReason,
}

/// Execution error taxonomy. `code()` gives a stable string so callers
/// can `match` without destructuring the enum.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("skill not found: {0}")]
    SkillNotFound(String),
    #[error("input not found: {0}")]
    InputNotFound(String),
    #[error("model API error: {0}")]
    ApiError(String),
    #[error("model API rate limited")]
    ApiRateLimited,
    #[error("model API overloaded")]
    ApiOverloaded,
    #[error("model API timeout")]
    ApiTimeout,
    #[error("response empty")]
    ResponseEmpty,
    #[error("workspace write failed: {0}")]
    WorkspaceWriteFailed(String),
    #[error("task not executable")]
    TaskNotExecutable,
    #[error("aborted")]
    Aborted,
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl ExecError {
    pub fn code(&self) -> &'static str {
        match self {
            ExecError::SkillNotFound(_) => "SKILL_NOT_FOUND",
            ExecError::InputNotFound(_) => "INPUT_NOT_FOUND",
            ExecError::ApiError(_) => "API_ERROR",
            ExecError::ApiRateLimited => "API_RATE_LIMITED",
            ExecError::ApiOverloaded => "API_OVERLOADED",
            ExecError::ApiTimeout => "API_TIMEOUT",
            ExecError::ResponseEmpty => "RESPONSE_EMPTY",
            ExecError::WorkspaceWriteFailed(_) => "WORKSPACE_WRITE_FAILED",
            ExecError::TaskNotExecutable => "TASK_NOT_EXECUTABLE",
            ExecError::Aborted => "ABORTED",
            ExecError::Unknown(_) => "UNKNOWN",
        }
    }

    /// The retryable set: rate-limited, overloaded, timeout, and
    /// other API errors. Everything else is fatal on first occurrence.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExecError::ApiError(_) | ExecError::ApiRateLimited | ExecError::ApiOverloaded | ExecError::ApiTimeout
        )
    }
}

/// The abstract LLM provider boundary: `complete(request) ->
/// response`, raising [`ExecError`] on failure. Consumed by `mf-engine`'s
/// Agent Executor; implemented for real against a provider SDK outside
/// this crate, and by [`crate::fakes::FakeMessageClient`] in tests.
#[async_trait]
pub trait MessageClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ExecError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_set_matches_taxonomy() {
        assert!(ExecError::ApiRateLimited.is_retryable());
        assert!(ExecError::ApiOverloaded.is_retryable());
        assert!(ExecError::ApiTimeout.is_retryable());
        assert!(ExecError::ApiError("x".into()).is_retryable());
        assert!(!ExecError::ResponseEmpty.is_retryable());
        assert!(!ExecError::SkillNotFound("x".into()).is_retryable());
        assert!(!ExecError::Aborted.is_retryable());
    }

    #[test]
    fn codes_match_taxonomy() {
        assert_eq!(ExecError::TaskNotExecutable.code(), "TASK_NOT_EXECUTABLE");
        assert_eq!(ExecError::Aborted.code(), "ABORTED");
    }
}
