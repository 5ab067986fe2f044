// SPDX-License-Identifier: MIT

//! Structured logging handle: `.child({bindings})` merges key/value
//! bindings into every entry emitted from the returned handle, without
//! needing dynamic `tracing::Value` fields — bindings are rendered as a
//! manual `key=val` suffix on the message rather than dynamic
//! `tracing::Value` fields.

use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Logger {
    bindings: Arc<Vec<(String, String)>>,
}

impl Logger {
    pub fn new() -> Self {
        Self { bindings: Arc::new(Vec::new()) }
    }

    /// Returns a new `Logger` with `bindings` merged into this one's. Later
    /// keys win on duplicate names, mirroring object-spread child-logger
    /// semantics.
    pub fn child(&self, bindings: &[(&str, &str)]) -> Logger {
        let mut merged = (*self.bindings).clone();
        for (k, v) in bindings {
            merged.retain(|(existing, _)| existing != k);
            merged.push((k.to_string(), v.to_string()));
        }
        Logger { bindings: Arc::new(merged) }
    }

    fn suffix(&self) -> String {
        if self.bindings.is_empty() {
            return String::new();
        }
        let pairs: Vec<String> = self.bindings.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!(" [{}]", pairs.join(" "))
    }

    pub fn info(&self, msg: &str) {
        tracing::info!("{}{}", msg, self.suffix());
    }

    pub fn warn(&self, msg: &str) {
        tracing::warn!("{}{}", msg, self.suffix());
    }

    pub fn error(&self, msg: &str) {
        tracing::error!("{}{}", msg, self.suffix());
    }

    pub fn debug(&self, msg: &str) {
        tracing::debug!("{}{}", msg, self.suffix());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_merges_and_overrides_bindings() {
        let root = Logger::new().child(&[("module", "scheduler")]);
        let child = root.child(&[("schedule_id", "daily-seo"), ("module", "scheduler.tick")]);
        assert_eq!(child.suffix(), " [module=scheduler.tick schedule_id=daily-seo]");
    }

    #[test]
    fn root_logger_has_empty_suffix() {
        assert_eq!(Logger::new().suffix(), "");
    }
}
