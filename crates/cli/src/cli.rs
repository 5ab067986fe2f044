// SPDX-License-Identifier: MIT

//! Argument shapes for the three invocation modes: a bare goal
//! string, `--pipeline <template>`, and `--daemon`, sharing one
//! `clap::Parser` struct rather than a subcommand enum since the bare
//! goal-string form has no keyword of its own to dispatch on.

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    P0,
    P1,
    #[default]
    P2,
    P3,
}

impl From<PriorityArg> for mf_core::Priority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::P0 => mf_core::Priority::P0,
            PriorityArg::P1 => mf_core::Priority::P1,
            PriorityArg::P2 => mf_core::Priority::P2,
            PriorityArg::P3 => mf_core::Priority::P3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "marketflow", version, about = "Autonomous marketing workflow orchestration runtime")]
pub struct Cli {
    /// Freeform goal description (single-goal mode).
    pub goal: Option<String>,

    /// Run a named pipeline template once and exit (one-shot pipeline mode).
    #[arg(long)]
    pub pipeline: Option<String>,

    /// Start the scheduler, queue worker, and event bus and run indefinitely.
    #[arg(long)]
    pub daemon: bool,

    #[arg(long, value_enum, default_value_t = PriorityArg::P2)]
    pub priority: PriorityArg,

    /// Decompose and print the goal plan without enqueueing any tasks.
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Validates that exactly one of the three invocation modes was
    /// selected
    /// `ArgGroup` can't span a positional and two long flags cleanly here).
    pub fn mode(&self) -> Result<Mode, String> {
        let selected =
            [self.goal.is_some(), self.pipeline.is_some(), self.daemon].iter().filter(|&&set| set).count();
        if selected == 0 {
            return Err("one of <goal>, --pipeline <template>, or --daemon is required".to_string());
        }
        if selected > 1 {
            return Err("<goal>, --pipeline, and --daemon are mutually exclusive".to_string());
        }
        if self.daemon {
            return Ok(Mode::Daemon);
        }
        if let Some(template) = &self.pipeline {
            return Ok(Mode::Pipeline(template.clone()));
        }
        match &self.goal {
            Some(goal) => Ok(Mode::Goal(goal.clone())),
            None => Err("one of <goal>, --pipeline <template>, or --daemon is required".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Goal(String),
    Pipeline(String),
    Daemon,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_no_mode() {
        let cli = Cli { goal: None, pipeline: None, daemon: false, priority: PriorityArg::P2, dry_run: false };
        assert!(cli.mode().is_err());
    }

    #[test]
    fn rejects_conflicting_modes() {
        let cli = Cli {
            goal: Some("grow traffic".to_string()),
            pipeline: Some("seo-cycle".to_string()),
            daemon: false,
            priority: PriorityArg::P2,
            dry_run: false,
        };
        assert!(cli.mode().is_err());
    }

    #[test]
    fn bare_goal_string_selects_goal_mode() {
        let cli = Cli {
            goal: Some("grow traffic".to_string()),
            pipeline: None,
            daemon: false,
            priority: PriorityArg::P1,
            dry_run: true,
        };
        assert_eq!(cli.mode().unwrap(), Mode::Goal("grow traffic".to_string()));
    }

    #[test]
    fn pipeline_flag_selects_pipeline_mode() {
        let cli = Cli { goal: None, pipeline: Some("seo-cycle".to_string()), daemon: false, priority: PriorityArg::P2, dry_run: false };
        assert_eq!(cli.mode().unwrap(), Mode::Pipeline("seo-cycle".to_string()));
    }

    #[test]
    fn daemon_flag_selects_daemon_mode() {
        let cli = Cli { goal: None, pipeline: None, daemon: true, priority: PriorityArg::P2, dry_run: false };
        assert_eq!(cli.mode().unwrap(), Mode::Daemon);
    }
}
