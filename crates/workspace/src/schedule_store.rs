// SPDX-License-Identifier: MIT

//! Typed schedule-state persistence: `schedules/{scheduleId}.json`.
//!
//! `ScheduleEntry` (the cron config) is not stored here — it's loaded once
//! at startup from the operator-supplied config and handed to the
//! Scheduler directly. Only `ScheduleState`, the Scheduler's write-through
//! cache of "when did this last fire", is durable.

use crate::error::WorkspaceError;
use crate::store::Workspace;
use mf_core::ScheduleState;

fn state_path(schedule_id: &str) -> String {
    format!("schedules/{schedule_id}.json")
}

impl Workspace {
    pub async fn write_schedule_state(&self, state: &ScheduleState) -> Result<(), WorkspaceError> {
        let json = serde_json::to_string_pretty(state).map_err(|e| WorkspaceError::ValidationError(e.to_string()))?;
        self.write_file(&state_path(&state.schedule_id), &json).await
    }

    pub async fn read_schedule_state(&self, schedule_id: &str) -> Result<ScheduleState, WorkspaceError> {
        let path = state_path(schedule_id);
        let text = self.read_file(&path).await?;
        serde_json::from_str(&text).map_err(|e| WorkspaceError::ParseError { path, message: e.to_string() })
    }

    /// All persisted schedule states, sorted by schedule id.
    pub async fn list_schedule_states(&self) -> Result<Vec<ScheduleState>, WorkspaceError> {
        let mut states = Vec::new();
        for relative in self.list_files("schedules", ".json").await? {
            let text = self.read_file(&relative).await?;
            let state = serde_json::from_str(&text)
                .map_err(|e| WorkspaceError::ParseError { path: relative.clone(), message: e.to_string() })?;
            states.push(state);
        }
        Ok(states)
    }
}

#[cfg(test)]
#[path = "schedule_store_tests.rs"]
mod tests;
