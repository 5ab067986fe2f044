// SPDX-License-Identifier: MIT

//! Task identifier, state machine, and the `Task` record itself.

use crate::id::{random_hex, IdBuf, ID_MAX_LEN};
use crate::priority::Priority;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Unique identifier for a task: `{skill}-{YYYYMMDD}-{6 random hex}`.
///
/// Unlike the fixed-prefix IDs produced by [`crate::define_id!`], a task ID's
/// prefix is the skill name itself, so it gets a hand-written constructor
/// rather than the macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub IdBuf);

impl TaskId {
    /// Build a new task ID for `skill`, stamped with `date` (`YYYYMMDD`) and a
    /// fresh random hex suffix.
    pub fn new(skill: &str, date: chrono::NaiveDate) -> Self {
        let raw = format!("{skill}-{}-{}", date.format("%Y%m%d"), random_hex(6));
        Self::from_string(&raw)
    }

    pub fn from_string(s: impl AsRef<str>) -> Self {
        let s = s.as_ref();
        let truncated = if s.len() > ID_MAX_LEN { &s[..ID_MAX_LEN] } else { s };
        Self(IdBuf::new(truncated))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

/// Who originated a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "skill")]
pub enum TaskOrigin {
    Skill(String),
    Director,
    Scheduler,
    EventBus,
}

impl std::fmt::Display for TaskOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskOrigin::Skill(s) => write!(f, "{s}"),
            TaskOrigin::Director => write!(f, "director"),
            TaskOrigin::Scheduler => write!(f, "scheduler"),
            TaskOrigin::EventBus => write!(f, "event-bus"),
        }
    }
}

impl TaskOrigin {
    pub fn parse(s: &str) -> Self {
        match s {
            "director" => TaskOrigin::Director,
            "scheduler" => TaskOrigin::Scheduler,
            "event-bus" => TaskOrigin::EventBus,
            skill => TaskOrigin::Skill(skill.to_string()),
        }
    }
}

/// Task lifecycle status. Transitions are validated by [`transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    InReview,
    Revision,
    Approved,
    Failed,
    Blocked,
    Cancelled,
    Deferred,
}

crate::simple_display! {
    TaskStatus {
        Pending => "pending",
        Assigned => "assigned",
        InProgress => "in_progress",
        Completed => "completed",
        InReview => "in_review",
        Revision => "revision",
        Approved => "approved",
        Failed => "failed",
        Blocked => "blocked",
        Cancelled => "cancelled",
        Deferred => "deferred",
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pending" => TaskStatus::Pending,
            "assigned" => TaskStatus::Assigned,
            "in_progress" => TaskStatus::InProgress,
            "completed" => TaskStatus::Completed,
            "in_review" => TaskStatus::InReview,
            "revision" => TaskStatus::Revision,
            "approved" => TaskStatus::Approved,
            "failed" => TaskStatus::Failed,
            "blocked" => TaskStatus::Blocked,
            "cancelled" => TaskStatus::Cancelled,
            "deferred" => TaskStatus::Deferred,
            other => return Err(format!("unknown task status: {other}")),
        })
    }
}

impl TaskStatus {
    /// Statuses from which the Agent Executor (C2) may pick up a task.
    pub fn is_executable(self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Assigned | TaskStatus::Revision)
    }

    /// `completed`/`failed` still have outgoing transitions in the table —
    /// `approved` and `cancelled` are the only states with none.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Approved | TaskStatus::Cancelled)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid task transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

/// Validate a state transition against the task lifecycle's transition
/// table. Returns `Ok(())` if `from -> to` is allowed, else the offending pair.
pub fn transition(from: TaskStatus, to: TaskStatus) -> Result<(), InvalidTransition> {
    use TaskStatus::*;
    let allowed: &[TaskStatus] = match from {
        Pending => &[Assigned, InProgress, Cancelled, Deferred],
        Assigned => &[InProgress, Cancelled, Failed],
        InProgress => &[Completed, Failed, Blocked, Cancelled],
        Completed => &[InReview, Approved],
        InReview => &[Approved, Revision, Failed],
        Revision => &[InProgress, Cancelled],
        Approved => &[],
        Failed => &[Pending, Cancelled],
        Blocked => &[Pending, Failed, Cancelled],
        Deferred => &[Pending, Cancelled],
        Cancelled => &[],
    };
    if allowed.contains(&to) {
        Ok(())
    } else {
        Err(InvalidTransition { from, to })
    }
}

/// What happens to a task's output once it completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskNext {
    DirectorReview,
    Agent { skill: String },
    PipelineContinue { pipeline_id: String },
    Complete,
}

impl std::fmt::Display for TaskNext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskNext::DirectorReview => write!(f, "director review"),
            TaskNext::Agent { skill } => write!(f, "agent: {skill}"),
            TaskNext::PipelineContinue { pipeline_id } => {
                write!(f, "continue pipeline {pipeline_id}")
            }
            TaskNext::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRef {
    pub path: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub path: String,
    pub format: String,
}

/// The unit of agent work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub from: TaskOrigin,
    pub to: String,
    pub priority: Priority,
    pub deadline_ms: Option<u64>,
    pub status: TaskStatus,
    pub revision_count: u32,
    pub goal_id: Option<String>,
    pub pipeline_id: Option<String>,
    pub goal: String,
    pub inputs: Vec<InputRef>,
    pub requirements: String,
    pub output: OutputSpec,
    pub next: TaskNext,
    pub tags: Vec<String>,
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Task {
    /// Apply a validated status transition, bumping `updated_at_ms`.
    pub fn set_status(&mut self, to: TaskStatus, now_ms: u64) -> Result<(), InvalidTransition> {
        transition(self.status, to)?;
        self.status = to;
        self.updated_at_ms = now_ms;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct TaskBuilder {
    pub id: TaskId,
    pub from: TaskOrigin,
    pub to: String,
    pub priority: Priority,
    pub deadline_ms: Option<u64>,
    pub status: TaskStatus,
    pub revision_count: u32,
    pub goal_id: Option<String>,
    pub pipeline_id: Option<String>,
    pub goal: String,
    pub inputs: Vec<InputRef>,
    pub requirements: String,
    pub output: OutputSpec,
    pub next: TaskNext,
    pub tags: Vec<String>,
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

#[cfg(any(test, feature = "test-support"))]
impl TaskBuilder {
    pub fn new(skill: impl Into<String>) -> Self {
        let skill = skill.into();
        Self {
            id: TaskId::new(&skill, chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default()),
            from: TaskOrigin::Director,
            to: skill,
            priority: Priority::P2,
            deadline_ms: None,
            status: TaskStatus::Pending,
            revision_count: 0,
            goal_id: None,
            pipeline_id: None,
            goal: String::new(),
            inputs: Vec::new(),
            requirements: String::new(),
            output: OutputSpec { path: String::new(), format: "markdown".to_string() },
            next: TaskNext::Complete,
            tags: Vec::new(),
            metadata: HashMap::new(),
            created_at_ms: 0,
            updated_at_ms: 0,
        }
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn inputs(mut self, inputs: Vec<InputRef>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn requirements(mut self, requirements: impl Into<String>) -> Self {
        self.requirements = requirements.into();
        self
    }

    pub fn output(mut self, path: impl Into<String>, format: impl Into<String>) -> Self {
        self.output = OutputSpec { path: path.into(), format: format.into() };
        self
    }

    pub fn next(mut self, next: TaskNext) -> Self {
        self.next = next;
        self
    }

    pub fn pipeline_id(mut self, id: impl Into<String>) -> Self {
        self.pipeline_id = Some(id.into());
        self
    }

    pub fn revision_count(mut self, n: u32) -> Self {
        self.revision_count = n;
        self
    }

    pub fn build(self) -> Task {
        Task {
            id: self.id,
            from: self.from,
            to: self.to,
            priority: self.priority,
            deadline_ms: self.deadline_ms,
            status: self.status,
            revision_count: self.revision_count,
            goal_id: self.goal_id,
            pipeline_id: self.pipeline_id,
            goal: self.goal,
            inputs: self.inputs,
            requirements: self.requirements,
            output: self.output,
            next: self.next,
            tags: self.tags,
            metadata: self.metadata,
            created_at_ms: self.created_at_ms,
            updated_at_ms: self.updated_at_ms,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
