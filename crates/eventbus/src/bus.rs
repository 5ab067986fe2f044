// SPDX-License-Identifier: MIT

//! Event Bus: routes incoming [`SystemEvent`]s to pipeline
//! activations with per-event-type conditional predicates, cooldown
//! windows, and idempotent per-event-id dedup.
//!
//! Never throws: every failure becomes a `skippedReasons` entry.

use crate::error::EventBusError;
use crate::mapping::EventMapping;
use mf_adapters::{Director, Logger, QueueManager};
use mf_core::{Clock, SystemEvent};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitResult {
    pub event_id: String,
    pub event_type: String,
    pub pipelines_triggered: usize,
    pub pipeline_ids: Vec<String>,
    pub skipped_reasons: Vec<String>,
}

struct BusState {
    mappings: Vec<EventMapping>,
    cooldown_until_ms: HashMap<String, u64>,
    processed_event_ids: HashSet<String>,
}

pub struct EventBus<C: Clock> {
    director: Arc<dyn Director>,
    queue_manager: Arc<dyn QueueManager>,
    clock: C,
    logger: Logger,
    state: Mutex<BusState>,
}

impl<C: Clock> EventBus<C> {
    pub fn new(director: Arc<dyn Director>, queue_manager: Arc<dyn QueueManager>, clock: C, logger: Logger) -> Self {
        Self {
            director,
            queue_manager,
            clock,
            logger,
            state: Mutex::new(BusState {
                mappings: Vec::new(),
                cooldown_until_ms: HashMap::new(),
                processed_event_ids: HashSet::new(),
            }),
        }
    }

    pub fn add_mapping(&self, mapping: EventMapping) {
        self.state.lock().mappings.push(mapping);
    }

    /// Removes every mapping of the given event type.
    pub fn remove_mapping_by_event(&self, event_type: &str) {
        self.state.lock().mappings.retain(|m| m.event_type != event_type);
    }

    /// Returns a defensive copy of the registered mappings.
    pub fn get_mappings(&self) -> Vec<EventMapping> {
        self.state.lock().mappings.clone()
    }

    /// Resets both the cooldown map and the dedup set.
    pub fn clear_cooldowns(&self) {
        let mut guard = self.state.lock();
        guard.cooldown_until_ms.clear();
        guard.processed_event_ids.clear();
    }

    /// Routes `event` to every matching mapping. `emit`
    /// is not reentrant per instance: callers serialize their own calls.
    pub async fn emit(&self, event: &SystemEvent) -> EmitResult {
        let mut result =
            EmitResult { event_id: event.id.clone(), event_type: event.event_type.clone(), ..Default::default() };

        if self.state.lock().processed_event_ids.contains(&event.id) {
            result.skipped_reasons.push("Duplicate event ID".to_string());
            return result;
        }

        let now_ms = self.clock.epoch_ms();
        let matching: Vec<EventMapping> = {
            let guard = self.state.lock();
            guard.mappings.iter().filter(|m| m.event_type == event.event_type).cloned().collect()
        };

        let cooldown_active = {
            let guard = self.state.lock();
            matching.iter().any(|m| m.cooldown_ms.is_some())
                && guard.cooldown_until_ms.get(&event.event_type).is_some_and(|until| *until > now_ms)
        };
        if cooldown_active {
            result.skipped_reasons.push("Cooldown active".to_string());
            self.state.lock().processed_event_ids.insert(event.id.clone());
            return result;
        }

        let mut latest_cooldown_until: Option<u64> = None;

        for mapping in &matching {
            match self.evaluate_condition(mapping, event) {
                Ok(true) => {}
                Ok(false) => {
                    result.skipped_reasons.push("Condition not met".to_string());
                    continue;
                }
                Err(e) => {
                    self.logger.warn(&format!("event condition error event_type={} err={e}", event.event_type));
                    result.skipped_reasons.push(format!("Condition error: {e}"));
                    continue;
                }
            }

            let description = format!("[Event: {}] {}", event.event_type, serde_json::to_string(&event.data).unwrap_or_default());

            match self.director.start_pipeline(&mapping.pipeline_template, &description, mapping.priority).await {
                Ok(started) => {
                    result.pipelines_triggered += 1;
                    result.pipeline_ids.push(started.run.id.to_string());

                    if let Some(cooldown_ms) = mapping.cooldown_ms {
                        let until = now_ms + cooldown_ms;
                        latest_cooldown_until = Some(latest_cooldown_until.map_or(until, |prev| prev.max(until)));
                    }

                    if let Err(e) = self.queue_manager.enqueue_batch(&started.tasks).await {
                        self.logger.error(&format!("enqueue_batch failed event_id={} err={e}", event.id));
                    }
                }
                Err(e) => {
                    self.logger.error(&format!(
                        "start_pipeline failed event_id={} template={} err={e}",
                        event.id, mapping.pipeline_template
                    ));
                    result.skipped_reasons.push(e.to_string());
                }
            }
        }

        {
            let mut guard = self.state.lock();
            if let Some(until) = latest_cooldown_until {
                guard.cooldown_until_ms.insert(event.event_type.clone(), until);
            }
            guard.processed_event_ids.insert(event.id.clone());
        }

        result
    }

    fn evaluate_condition(&self, mapping: &EventMapping, event: &SystemEvent) -> Result<bool, EventBusError> {
        match &mapping.condition {
            None => Ok(true),
            Some(condition) => condition(event),
        }
    }
}
