// SPDX-License-Identifier: MIT

//! `EventMapping`: `eventType -> pipelineTemplate` with an optional
//! cooldown and predicate. The predicate isn't serializable data — callers
//! register it as a plain closure — so this type, unlike [`mf_core::SystemEvent`],
//! lives here alongside the bus that owns and calls it.

use crate::error::EventBusError;
use mf_core::{Priority, SystemEvent};
use std::sync::Arc;

/// `condition(event) -> bool`. Returns `Err` to model a condition that
/// throws, reported as `Condition error: {msg}`, without reaching for
/// `catch_unwind` on a closure call, which would be the wrong tool for a
/// predicate that's meant to report failure, not panic.
pub type Condition = Arc<dyn Fn(&SystemEvent) -> Result<bool, EventBusError> + Send + Sync>;

#[derive(Clone)]
pub struct EventMapping {
    pub event_type: String,
    pub pipeline_template: String,
    pub priority: Priority,
    pub cooldown_ms: Option<u64>,
    pub condition: Option<Condition>,
}

impl EventMapping {
    pub fn new(event_type: impl Into<String>, pipeline_template: impl Into<String>, priority: Priority) -> Self {
        Self {
            event_type: event_type.into(),
            pipeline_template: pipeline_template.into(),
            priority,
            cooldown_ms: None,
            condition: None,
        }
    }

    pub fn with_cooldown(mut self, cooldown_ms: u64) -> Self {
        self.cooldown_ms = Some(cooldown_ms);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

impl std::fmt::Debug for EventMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventMapping")
            .field("event_type", &self.event_type)
            .field("pipeline_template", &self.pipeline_template)
            .field("priority", &self.priority)
            .field("cooldown_ms", &self.cooldown_ms)
            .field("condition", &self.condition.is_some())
            .finish()
    }
}
