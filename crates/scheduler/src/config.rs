// SPDX-License-Identifier: MIT

//! Scheduler tuning knobs.

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between ticks once `run()` is started. Default 60 s.
    pub tick_interval_ms: u64,
    /// Whether `start()` runs a catch-up pass before the first tick.
    pub catch_up_enabled: bool,
    /// How far back `previousCronMatch` is allowed to search during catch-up.
    pub catch_up_lookback_days: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { tick_interval_ms: 60_000, catch_up_enabled: true, catch_up_lookback_days: 31 }
    }
}
