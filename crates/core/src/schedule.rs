// SPDX-License-Identifier: MIT

//! Schedule entries (config) and schedule state (durable, per-entry).

use crate::priority::Priority;
use serde::{Deserialize, Serialize};

/// A configured cron trigger. Either fires a pipeline template directly, or
/// (when `pipeline_id` begins with `goal:`) triggers goal creation of that
/// type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: String,
    pub name: String,
    pub cron: String,
    pub pipeline_id: String,
    pub enabled: bool,
    pub priority: Priority,
    pub goal_category: Option<String>,
    pub description: String,
}

impl ScheduleEntry {
    pub fn goal_type(&self) -> Option<&str> {
        self.pipeline_id.strip_prefix("goal:")
    }
}

/// Persisted per-schedule state, mirrored in memory by the Scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleState {
    pub schedule_id: String,
    pub last_fired_at_ms: Option<u64>,
    pub last_skip_reason: Option<String>,
    pub fire_count: u64,
}

impl ScheduleState {
    pub fn fresh(schedule_id: impl Into<String>) -> Self {
        Self {
            schedule_id: schedule_id.into(),
            last_fired_at_ms: None,
            last_skip_reason: None,
            fire_count: 0,
        }
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
