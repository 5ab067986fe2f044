// SPDX-License-Identifier: MIT

//! Task priority and the budget-gating types the Scheduler consults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

crate::simple_display! {
    Priority {
        P0 => "P0",
        P1 => "P1",
        P2 => "P2",
        P3 => "P3",
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "P0" => Ok(Priority::P0),
            "P1" => Ok(Priority::P1),
            "P2" => Ok(Priority::P2),
            "P3" => Ok(Priority::P3),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Coarse cost-pressure indicator reported by the (external) Budget Provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    Normal,
    Warning,
    Throttle,
    Critical,
    Exhausted,
}

crate::simple_display! {
    BudgetLevel {
        Normal => "normal",
        Warning => "warning",
        Throttle => "throttle",
        Critical => "critical",
        Exhausted => "exhausted",
    }
}

/// Snapshot returned by the external `BudgetProvider`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetState {
    pub total_budget: f64,
    pub spent: f64,
    pub percent_used: f64,
    pub level: BudgetLevel,
    pub allowed_priorities: Vec<Priority>,
    pub model_override: Option<String>,
}

impl BudgetState {
    pub fn allows(&self, priority: Priority) -> bool {
        self.allowed_priorities.contains(&priority)
    }
}

#[cfg(test)]
#[path = "priority_tests.rs"]
mod tests;
