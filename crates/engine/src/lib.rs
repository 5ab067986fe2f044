// SPDX-License-Identifier: MIT

//! Pipeline Engine (C1) and Agent Executor (C2).

pub mod config;
pub mod error;
pub mod executor;
pub mod pipeline;

pub use config::{ExecuteOverride, ExecutorConfig, PipelineConfig};
pub use error::PipelineError;
pub use executor::{AgentExecutor, ExecuteOptions, ExecutionError, ExecutionResult, ExecutionStatus, TokenUsage};
pub use pipeline::{PipelineEngine, PipelineResult, PipelineRunConfig, PipelineStatus, StepResult, StepStatus};
