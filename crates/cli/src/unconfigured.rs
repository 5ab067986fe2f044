// SPDX-License-Identifier: MIT

//! Placeholder adapters for the Director, Queue Manager, Message Client,
//! and Budget Provider boundaries this binary cannot itself
//! implement — goal decomposition, batch dispatch, and the LLM provider are
//! explicitly out of scope. A real deployment supplies its own
//! adapters; standing this binary up without one should fail loudly and
//! immediately rather than hang or silently no-op, so every method here
//! returns the boundary's own "unknown"/"other" error variant carrying a
//! fixed explanation.

use async_trait::async_trait;
use mf_adapters::{
    BudgetProvider, CompletionRequest, CompletionResponse, Director, DirectorError, ExecError,
    MessageClient, QueueManager, QueueManagerError,
};
use mf_core::{BudgetLevel, BudgetState, Goal, GoalPlan, Priority, Task};

const NOT_CONFIGURED: &str = "no Director is configured for this process";

pub struct UnconfiguredDirector;

#[async_trait]
impl Director for UnconfiguredDirector {
    async fn start_pipeline(
        &self,
        _template_name: &str,
        _description: &str,
        _priority: Priority,
    ) -> Result<mf_adapters::StartPipelineResult, DirectorError> {
        Err(DirectorError::Other(NOT_CONFIGURED.to_string()))
    }

    async fn create_goal(&self, _description: &str, _category: &str, _priority: Option<Priority>) -> Result<Goal, DirectorError> {
        Err(DirectorError::Other(NOT_CONFIGURED.to_string()))
    }

    async fn decompose_goal(&self, _goal: &Goal) -> Result<GoalPlan, DirectorError> {
        Err(DirectorError::Other(NOT_CONFIGURED.to_string()))
    }

    async fn plan_goal_tasks(&self, _plan: &GoalPlan, _goal: &Goal) -> Result<Vec<Task>, DirectorError> {
        Err(DirectorError::Other(NOT_CONFIGURED.to_string()))
    }
}

pub struct UnconfiguredQueueManager;

#[async_trait]
impl QueueManager for UnconfiguredQueueManager {
    async fn enqueue_batch(&self, _tasks: &[Task]) -> Result<(), QueueManagerError> {
        Err(QueueManagerError("no Queue Manager is configured for this process".to_string()))
    }
}

pub struct UnconfiguredMessageClient;

#[async_trait]
impl MessageClient for UnconfiguredMessageClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, ExecError> {
        Err(ExecError::Unknown("no Message Client is configured for this process".to_string()))
    }
}

/// Always reports an unthrottled budget so the Scheduler never stalls on a
/// process with no real cost tracker wired in.
pub struct StaticBudgetProvider;

impl BudgetProvider for StaticBudgetProvider {
    fn current(&self) -> BudgetState {
        BudgetState {
            total_budget: 0.0,
            spent: 0.0,
            percent_used: 0.0,
            level: BudgetLevel::Normal,
            allowed_priorities: vec![Priority::P0, Priority::P1, Priority::P2, Priority::P3],
            model_override: None,
        }
    }
}
