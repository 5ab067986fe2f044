// SPDX-License-Identifier: MIT

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::goal::{Goal, GoalId};
use crate::pipeline::{PipelineDefinition, PipelineRun, PipelineRunId, PipelineRunStatus, PipelineStep, PipelineTrigger};
use crate::priority::Priority;
use crate::task::{InputRef, OutputSpec, Task, TaskId, TaskNext, TaskOrigin, TaskStatus};
use std::collections::HashMap;

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::task::TaskStatus;
    use proptest::prelude::*;

    pub fn arb_task_status() -> impl Strategy<Value = TaskStatus> {
        prop_oneof![
            Just(TaskStatus::Pending),
            Just(TaskStatus::Assigned),
            Just(TaskStatus::InProgress),
            Just(TaskStatus::Completed),
            Just(TaskStatus::InReview),
            Just(TaskStatus::Revision),
            Just(TaskStatus::Approved),
            Just(TaskStatus::Failed),
            Just(TaskStatus::Blocked),
            Just(TaskStatus::Cancelled),
            Just(TaskStatus::Deferred),
        ]
    }

    pub fn arb_priority() -> impl Strategy<Value = crate::priority::Priority> {
        prop_oneof![
            Just(crate::priority::Priority::P0),
            Just(crate::priority::Priority::P1),
            Just(crate::priority::Priority::P2),
            Just(crate::priority::Priority::P3),
        ]
    }
}

// ── Task factory functions ──────────────────────────────────────────────

pub fn sample_task(skill: &str, status: TaskStatus) -> Task {
    Task {
        id: TaskId::new(skill, chrono::NaiveDate::from_ymd_opt(2026, 2, 16).unwrap_or_default()),
        from: TaskOrigin::Director,
        to: skill.to_string(),
        priority: Priority::P2,
        deadline_ms: None,
        status,
        revision_count: 0,
        goal_id: None,
        pipeline_id: None,
        goal: "exercise the pipeline".to_string(),
        inputs: vec![InputRef { path: "inputs/brief.md".to_string(), description: "campaign brief".to_string() }],
        requirements: "follow the brief".to_string(),
        output: OutputSpec { path: format!("outputs/{skill}.md"), format: "markdown".to_string() },
        next: TaskNext::DirectorReview,
        tags: Vec::new(),
        metadata: HashMap::new(),
        created_at_ms: 1_000_000,
        updated_at_ms: 1_000_000,
    }
}

pub fn sequential_pipeline(id: &str, skills: &[&str]) -> PipelineDefinition {
    PipelineDefinition {
        id: id.to_string(),
        name: id.to_string(),
        description: String::new(),
        steps: skills.iter().map(|s| PipelineStep::Sequential { skill: s.to_string() }).collect(),
        default_priority: Priority::P2,
        trigger: PipelineTrigger::Manual,
    }
}

pub fn parallel_step(skills: &[&str]) -> PipelineStep {
    PipelineStep::Parallel { skills: skills.iter().map(|s| s.to_string()).collect() }
}

pub fn fresh_run(pipeline_id: &str) -> PipelineRun {
    let mut run = PipelineRun::new(PipelineRunId::new(), pipeline_id, Some(GoalId::new().to_string()), 1_000_000);
    run.status = PipelineRunStatus::Running;
    run
}

pub fn sample_goal(description: &str) -> Goal {
    Goal { id: GoalId::new(), description: description.to_string(), category: "marketing".to_string(), priority: Priority::P2, created_at_ms: 1_000_000 }
}
