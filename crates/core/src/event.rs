// SPDX-License-Identifier: MIT

//! System events consumed by the Event Bus.
//!
//! `EventMapping` is *not* defined here: it carries a `condition(event) ->
//! bool` closure, which isn't serializable data, so it lives in `mf-eventbus`
//! alongside the bus that owns and calls it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp_ms: u64,
    pub source: String,
    pub data: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
