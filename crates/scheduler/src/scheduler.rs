// SPDX-License-Identifier: MIT

//! Cron-driven trigger loop: fires scheduled pipeline
//! activations exactly once per matched minute, subject to overlap and
//! budget gates, and survives restarts via the durable `ScheduleState`
//! write-through cache in `mf_workspace::schedule_store`.
//!
//! Never throws: `tick()` swallows every per-schedule failure into a
//! `SkippedEntry`.

use crate::config::SchedulerConfig;
use chrono::{Datelike, Timelike};
use mf_adapters::{BudgetProvider, Director, Logger};
use mf_core::{
    next_cron_match, previous_cron_match, CancelToken, Clock, CronFields, Priority, ScheduleEntry,
    ScheduleState,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
struct ScheduleSlot {
    entry: ScheduleEntry,
    cron: CronFields,
}

#[derive(Debug, Clone)]
struct RunningPipeline {
    #[allow(dead_code)]
    started_at_ms: u64,
    pipeline_id: String,
}

struct SchedulerState {
    schedules: Vec<ScheduleSlot>,
    states: HashMap<String, ScheduleState>,
    running_pipelines: HashMap<String, RunningPipeline>,
    fired_this_minute: HashSet<String>,
    last_minute_key: Option<(i32, u32, u32, u32, u32)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredEntry {
    pub schedule_id: String,
    pub pipeline_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub schedule_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub fired: Vec<FiredEntry>,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct StartReport {
    /// Schedule ids dropped at `start()` for an unparseable cron expression.
    pub dropped_invalid_cron: Vec<String>,
    pub catch_up: TickReport,
}

pub struct Scheduler<C: Clock> {
    workspace: mf_workspace::Workspace,
    director: Arc<dyn Director>,
    budget: Arc<dyn BudgetProvider>,
    clock: C,
    logger: Logger,
    config: SchedulerConfig,
    state: Mutex<SchedulerState>,
    tick_in_progress: AtomicBool,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(
        workspace: mf_workspace::Workspace,
        director: Arc<dyn Director>,
        budget: Arc<dyn BudgetProvider>,
        clock: C,
        logger: Logger,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            workspace,
            director,
            budget,
            clock,
            logger,
            config,
            state: Mutex::new(SchedulerState {
                schedules: Vec::new(),
                states: HashMap::new(),
                running_pipelines: HashMap::new(),
                fired_this_minute: HashSet::new(),
                last_minute_key: None,
            }),
            tick_in_progress: AtomicBool::new(false),
        }
    }

    /// Load `entries` (dropping any with an unparseable cron), restore
    /// persisted state, and run catch-up if configured.
    pub async fn start(&self, entries: Vec<ScheduleEntry>) -> StartReport {
        let mut dropped = Vec::new();
        let mut slots = Vec::new();
        let mut states = HashMap::new();

        for entry in entries {
            match mf_core::parse_cron(&entry.cron) {
                Ok(cron) => {
                    let state = match self.workspace.read_schedule_state(&entry.id).await {
                        Ok(s) => s,
                        Err(e) if e.code() == "NOT_FOUND" => ScheduleState::fresh(entry.id.clone()),
                        Err(e) => {
                            self.logger.warn(&format!("failed to restore schedule state id={} err={e}", entry.id));
                            ScheduleState::fresh(entry.id.clone())
                        }
                    };
                    states.insert(entry.id.clone(), state);
                    slots.push(ScheduleSlot { entry, cron });
                }
                Err(e) => {
                    self.logger.warn(&format!("dropping schedule with invalid cron id={} err={e}", entry.id));
                    dropped.push(entry.id);
                }
            }
        }

        {
            let mut guard = self.state.lock();
            guard.schedules = slots;
            guard.states = states;
        }

        let catch_up =
            if self.config.catch_up_enabled { self.run_catch_up().await } else { TickReport::default() };

        StartReport { dropped_invalid_cron: dropped, catch_up }
    }

    /// Run the tick loop until `cancel` fires: sleeps to the next wall-clock
    /// minute boundary, then ticks every `tick_interval_ms`.
    pub async fn run(&self, cancel: CancelToken) {
        let until_next_minute = 60_000 - (self.clock.epoch_ms() % 60_000);
        if cancel.sleep(Duration::from_millis(until_next_minute)).await.is_err() {
            return;
        }

        let mut interval = tokio::time::interval(Duration::from_millis(self.config.tick_interval_ms));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let report = self.tick().await;
                    for skipped in &report.skipped {
                        self.logger.debug(&format!("schedule skipped id={} reason={}", skipped.schedule_id, skipped.reason));
                    }
                }
                _ = cancel.cancelled() => break,
            }
        }
    }

    /// One non-overlapping pass over every loaded schedule.
    pub async fn tick(&self) -> TickReport {
        if self.tick_in_progress.swap(true, Ordering::SeqCst) {
            self.logger.warn("tick overlap: previous tick still running, skipping");
            return TickReport {
                fired: Vec::new(),
                skipped: vec![SkippedEntry { schedule_id: String::new(), reason: "tick_overlap_skipped".to_string() }],
            };
        }
        let report = self.tick_inner().await;
        self.tick_in_progress.store(false, Ordering::SeqCst);
        report
    }

    async fn tick_inner(&self) -> TickReport {
        let now_ms = self.clock.epoch_ms();
        let now = datetime_from_epoch_ms(now_ms);
        let minute_key = (now.year(), now.month(), now.day(), now.hour(), now.minute());

        let snapshot: Vec<ScheduleSlot> = {
            let mut guard = self.state.lock();
            if guard.last_minute_key != Some(minute_key) {
                guard.fired_this_minute.clear();
                guard.last_minute_key = Some(minute_key);
            }
            guard.schedules.clone()
        };

        let mut report = TickReport::default();

        for slot in &snapshot {
            let id = slot.entry.id.clone();

            if !slot.entry.enabled {
                report.skipped.push(SkippedEntry { schedule_id: id, reason: "disabled".to_string() });
                continue;
            }
            if !slot.cron.matches(now) {
                continue;
            }

            let gate = {
                let guard = self.state.lock();
                if guard.fired_this_minute.contains(&id) {
                    Some("already_fired_this_minute")
                } else if guard.running_pipelines.contains_key(&id) {
                    Some("pipeline_still_running")
                } else {
                    None
                }
            };
            if let Some(reason) = gate {
                if reason == "pipeline_still_running" {
                    self.logger.info(&format!("schedule still running, skipping id={id}"));
                }
                report.skipped.push(SkippedEntry { schedule_id: id, reason: reason.to_string() });
                continue;
            }

            let budget = self.budget.current();
            if !budget.allows(slot.entry.priority) {
                let reason = format!("budget_{}", budget.level);
                self.update_skip_reason(&id, &reason).await;
                report.skipped.push(SkippedEntry { schedule_id: id, reason });
                continue;
            }

            match self.fire(slot, now_ms).await {
                Ok(fired) => {
                    {
                        let mut guard = self.state.lock();
                        guard.fired_this_minute.insert(id);
                    }
                    report.fired.push(fired);
                }
                Err(message) => {
                    let reason = format!("fire_error: {message}");
                    self.update_skip_reason(&id, &reason).await;
                    report.skipped.push(SkippedEntry { schedule_id: id, reason });
                }
            }
        }

        report
    }

    async fn run_catch_up(&self) -> TickReport {
        let now = datetime_from_epoch_ms(self.clock.epoch_ms());

        struct Candidate {
            slot: ScheduleSlot,
            prev: chrono::NaiveDateTime,
        }

        let mut candidates = Vec::new();
        {
            let guard = self.state.lock();
            for slot in &guard.schedules {
                if !slot.entry.enabled {
                    continue;
                }
                let Some(prev) = previous_cron_match(&slot.cron, now, self.config.catch_up_lookback_days) else {
                    continue;
                };
                let last_fired = guard.states.get(&slot.entry.id).and_then(|s| s.last_fired_at_ms);
                let needs_catch_up = match last_fired {
                    None => true,
                    Some(ms) => datetime_from_epoch_ms(ms) < prev,
                };
                if needs_catch_up {
                    candidates.push(Candidate { slot: slot.clone(), prev });
                }
            }
        }

        // P0 before P3; ties preserve source order.
        candidates.sort_by_key(|c| c.slot.entry.priority);

        let mut report = TickReport::default();
        for candidate in candidates {
            let budget = self.budget.current();
            if !budget.allows(candidate.slot.entry.priority) {
                report.skipped.push(SkippedEntry {
                    schedule_id: candidate.slot.entry.id.clone(),
                    reason: format!("budget_{}", budget.level),
                });
                continue;
            }

            let fire_time_ms = epoch_ms_from_datetime(candidate.prev);
            match self.fire(&candidate.slot, fire_time_ms).await {
                Ok(fired) => report.fired.push(fired),
                Err(message) => {
                    report.skipped.push(SkippedEntry {
                        schedule_id: candidate.slot.entry.id.clone(),
                        reason: format!("fire_error: {message}"),
                    });
                }
            }
        }

        report
    }

    async fn fire(&self, slot: &ScheduleSlot, fire_time_ms: u64) -> Result<FiredEntry, String> {
        let entry = &slot.entry;
        let fire_time = datetime_from_epoch_ms(fire_time_ms);
        let description = format!("{} ({})", entry.description, fire_time.format("%Y-%m-%d %H:%M"));

        let pipeline_id = if let Some(goal_type) = entry.goal_type() {
            let category = entry.goal_category.clone().unwrap_or_else(|| goal_type.to_string());
            let goal = self
                .director
                .create_goal(&description, &category, Some(entry.priority))
                .await
                .map_err(|e| e.to_string())?;
            let plan = self.director.decompose_goal(&goal).await.map_err(|e| e.to_string())?;
            self.director.plan_goal_tasks(&plan, &goal).await.map_err(|e| e.to_string())?;
            format!("goal:{}", goal.id)
        } else {
            let result = self
                .director
                .start_pipeline(&entry.pipeline_id, &description, entry.priority)
                .await
                .map_err(|e| e.to_string())?;
            result.run.id.to_string()
        };

        let started_at_ms = self.clock.epoch_ms();
        let state = {
            let mut guard = self.state.lock();
            guard
                .running_pipelines
                .insert(entry.id.clone(), RunningPipeline { started_at_ms, pipeline_id: pipeline_id.clone() });
            let state = guard.states.entry(entry.id.clone()).or_insert_with(|| ScheduleState::fresh(entry.id.clone()));
            state.last_fired_at_ms = Some(fire_time_ms);
            state.last_skip_reason = None;
            state.fire_count += 1;
            state.clone()
        };
        if let Err(e) = self.workspace.write_schedule_state(&state).await {
            self.logger.warn(&format!("failed to persist schedule state id={} err={e}", entry.id));
        }

        Ok(FiredEntry { schedule_id: entry.id.clone(), pipeline_id })
    }

    async fn update_skip_reason(&self, id: &str, reason: &str) {
        let state = {
            let mut guard = self.state.lock();
            let state = guard.states.entry(id.to_string()).or_insert_with(|| ScheduleState::fresh(id.to_string()));
            state.last_skip_reason = Some(reason.to_string());
            state.clone()
        };
        if let Err(e) = self.workspace.write_schedule_state(&state).await {
            self.logger.warn(&format!("failed to persist schedule state id={id} err={e}"));
        }
    }

    /// Clear a schedule's overlap-suppression entry once its fired
    /// pipeline completes. Guarded by the same mutex `tick` uses, so a
    /// concurrent call can never observe `running_pipelines` mid-mutation.
    pub fn mark_completed(&self, schedule_id: &str) {
        let mut guard = self.state.lock();
        guard.running_pipelines.remove(schedule_id);
    }

    /// Scan forward for the next matching instant, or `None` if the
    /// schedule id is unknown or no match exists within the search window.
    pub fn get_next_firing(&self, schedule_id: &str) -> Option<chrono::NaiveDateTime> {
        let guard = self.state.lock();
        let slot = guard.schedules.iter().find(|s| s.entry.id == schedule_id)?;
        let now = datetime_from_epoch_ms(self.clock.epoch_ms());
        next_cron_match(&slot.cron, now)
    }
}

fn datetime_from_epoch_ms(ms: u64) -> chrono::NaiveDateTime {
    chrono::DateTime::from_timestamp_millis(ms as i64)
        .map(|dt: chrono::DateTime<chrono::Utc>| dt.naive_utc())
        .unwrap_or_default()
}

fn epoch_ms_from_datetime(dt: chrono::NaiveDateTime) -> u64 {
    dt.and_utc().timestamp_millis().max(0) as u64
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
