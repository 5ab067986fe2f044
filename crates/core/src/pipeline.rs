// SPDX-License-Identifier: MIT

//! Pipeline definitions and runtime instances.

use crate::priority::Priority;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier for a `PipelineRun` instance.
    pub struct PipelineRunId("run-");
}

/// One step of a `PipelineDefinition`. A closed tagged variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineStep {
    Sequential { skill: String },
    Parallel { skills: Vec<String> },
    Review { reviewer: String },
}

impl PipelineStep {
    pub fn label(&self) -> String {
        match self {
            PipelineStep::Sequential { skill } => skill.clone(),
            PipelineStep::Parallel { skills } => skills.join("+"),
            PipelineStep::Review { reviewer } => format!("review:{reviewer}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineTrigger {
    Manual,
    Schedule { cron: String },
    Event { event_type: String },
}

/// A pipeline template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub steps: Vec<PipelineStep>,
    pub default_priority: Priority,
    pub trigger: PipelineTrigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineRunStatus {
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    PipelineRunStatus {
        Pending => "pending",
        Running => "running",
        Paused => "paused",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// A runtime instance of a `PipelineDefinition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub id: PipelineRunId,
    pub pipeline_id: String,
    pub goal_id: Option<String>,
    pub started_at_ms: u64,
    pub completed_at_ms: Option<u64>,
    pub status: PipelineRunStatus,
    pub current_step_index: usize,
    /// Every task created on behalf of this run, in creation order. Append-only.
    pub task_ids: Vec<String>,
}

impl PipelineRun {
    pub fn new(id: PipelineRunId, pipeline_id: impl Into<String>, goal_id: Option<String>, now_ms: u64) -> Self {
        Self {
            id,
            pipeline_id: pipeline_id.into(),
            goal_id,
            started_at_ms: now_ms,
            completed_at_ms: None,
            status: PipelineRunStatus::Pending,
            current_step_index: 0,
            task_ids: Vec::new(),
        }
    }

    /// Invariant: `completed_at` is set iff the run is in
    /// a terminal status.
    pub fn invariant_holds(&self) -> bool {
        let terminal = matches!(
            self.status,
            PipelineRunStatus::Completed | PipelineRunStatus::Failed | PipelineRunStatus::Cancelled
        );
        self.completed_at_ms.is_some() == terminal
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
