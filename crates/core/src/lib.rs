// SPDX-License-Identifier: MIT

//! Shared data model, IDs, clock, cancellation, and cron primitives used by
//! every other crate in this workspace.
//!
//! This crate carries no I/O and no async runtime dependency beyond the
//! `tokio::sync`/`tokio::time` primitives that back [`cancel::CancelToken`];
//! everything here is plain data plus pure functions, so it's cheap to unit
//! test in isolation and safe to depend on from both the engine and the
//! daemon without pulling in workspace I/O or adapter traits.

#[macro_use]
pub mod macros;

pub mod cancel;
pub mod clock;
pub mod cron;
pub mod event;
pub mod goal;
pub mod id;
pub mod pipeline;
pub mod priority;
pub mod review;
pub mod schedule;
pub mod task;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use cancel::CancelToken;
pub use clock::{Clock, FakeClock, SystemClock};
pub use cron::{cron_matches, next_cron_match, parse_cron, previous_cron_match, CronFields, CronParseError};
pub use event::SystemEvent;
pub use goal::{Goal, GoalId, GoalPhase, GoalPlan};
pub use id::{random_hex, short, IdBuf, ID_MAX_LEN};
pub use pipeline::{
    PipelineDefinition, PipelineRun, PipelineRunId, PipelineRunStatus, PipelineStep, PipelineTrigger,
};
pub use priority::{BudgetLevel, BudgetState, Priority};
pub use review::{
    CostEntry, Finding, HumanReviewId, HumanReviewItem, HumanReviewStatus, LearningEntry, Review, ReviewId,
    RevisionPriority, RevisionRequest, Severity, Urgency, Verdict,
};
pub use schedule::{ScheduleEntry, ScheduleState};
pub use task::{
    transition, InputRef, InvalidTransition, OutputSpec, Task, TaskId, TaskNext, TaskOrigin, TaskStatus,
};

#[cfg(any(test, feature = "test-support"))]
pub use task::TaskBuilder;
