// SPDX-License-Identifier: MIT

//! Scheduler (C3): cron-driven trigger loop with budget gating and catch-up.

pub mod config;
pub mod scheduler;

pub use config::SchedulerConfig;
pub use scheduler::{FiredEntry, Scheduler, SkippedEntry, StartReport, TickReport};
