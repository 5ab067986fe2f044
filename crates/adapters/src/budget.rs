// SPDX-License-Identifier: MIT

//! The Budget Provider boundary, consumed by the Scheduler (C3) as a
//! gate on which priorities may fire.

use mf_core::BudgetState;

/// `() -> BudgetState` — a plain synchronous callback rather than an
/// async trait, since a real implementation just reads an in-memory spend
/// counter maintained by the (external) cost tracker.
pub trait BudgetProvider: Send + Sync {
    fn current(&self) -> BudgetState;
}

impl<F> BudgetProvider for F
where
    F: Fn() -> BudgetState + Send + Sync,
{
    fn current(&self) -> BudgetState {
        self()
    }
}
