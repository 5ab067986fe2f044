// SPDX-License-Identifier: MIT

//! The Director boundary: goal decomposition, pipeline selection,
//! and review verdicts — out of scope for this runtime, consumed here only
//! as the interface the Scheduler (C3) and Event Bus (C4) call into.

use async_trait::async_trait;
use mf_core::{Goal, GoalPlan, Priority, Task};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectorError {
    #[error("unknown pipeline template: {0}")]
    UnknownTemplate(String),
    #[error("director error: {0}")]
    Other(String),
}

/// What `Director::start_pipeline` hands back to the caller.
#[derive(Debug, Clone)]
pub struct StartPipelineResult {
    pub definition: mf_core::PipelineDefinition,
    pub run: mf_core::PipelineRun,
    pub tasks: Vec<Task>,
}

#[async_trait]
pub trait Director: Send + Sync {
    async fn start_pipeline(
        &self,
        template_name: &str,
        description: &str,
        priority: Priority,
    ) -> Result<StartPipelineResult, DirectorError>;

    async fn create_goal(
        &self,
        description: &str,
        category: &str,
        priority: Option<Priority>,
    ) -> Result<Goal, DirectorError>;

    async fn decompose_goal(&self, goal: &Goal) -> Result<GoalPlan, DirectorError>;

    async fn plan_goal_tasks(&self, plan: &GoalPlan, goal: &Goal) -> Result<Vec<Task>, DirectorError>;
}
