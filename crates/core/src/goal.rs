// SPDX-License-Identifier: MIT

//! Goals and their phase breakdowns.

use crate::priority::Priority;
use serde::{Deserialize, Serialize};

crate::define_id! {
    pub struct GoalId("goal-");
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    pub created_at_ms: u64,
}

/// One phase of a `GoalPlan`: a set of skills to run, optionally in parallel,
/// optionally depending on an earlier phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalPhase {
    pub skills: Vec<String>,
    pub parallel: bool,
    pub depends_on_phase: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalPlan {
    pub goal_id: GoalId,
    pub phases: Vec<GoalPhase>,
}

#[cfg(test)]
#[path = "goal_tests.rs"]
mod tests;
