// SPDX-License-Identifier: MIT

//! The Queue Manager boundary: batch task enqueue, consumed only by
//! the Event Bus (C4) after a successful pipeline activation.

use async_trait::async_trait;
use mf_core::Task;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("queue manager error: {0}")]
pub struct QueueManagerError(pub String);

#[async_trait]
pub trait QueueManager: Send + Sync {
    async fn enqueue_batch(&self, tasks: &[Task]) -> Result<(), QueueManagerError>;
}
