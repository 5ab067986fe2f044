// SPDX-License-Identifier: MIT

//! Event Bus error taxonomy. `emit()` never propagates
//! these — they only ever become a skip reason string — but keeping a
//! typed enum around mirrors every other crate boundary's `code()` idiom
//! and gives `mf-daemon`'s webhook handler something concrete to log.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventBusError {
    #[error("condition evaluation failed: {0}")]
    ConditionFailed(String),
    #[error("director error: {0}")]
    DirectorFailed(String),
    #[error("queue manager error: {0}")]
    QueueFailed(String),
}

impl EventBusError {
    pub fn code(&self) -> &'static str {
        match self {
            EventBusError::ConditionFailed(_) => "CONDITION_ERROR",
            EventBusError::DirectorFailed(_) => "DIRECTOR_ERROR",
            EventBusError::QueueFailed(_) => "QUEUE_ERROR",
        }
    }
}
