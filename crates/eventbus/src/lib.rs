// SPDX-License-Identifier: MIT

//! Event Bus (C4): routes incoming events to pipeline activations.

pub mod bus;
pub mod error;
pub mod mapping;

pub use bus::{EmitResult, EventBus};
pub use error::EventBusError;
pub use mapping::{Condition, EventMapping};
