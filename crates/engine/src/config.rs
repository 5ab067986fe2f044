// SPDX-License-Identifier: MIT

//! Executor and pipeline tuning knobs.

use std::collections::HashMap;
use std::time::Duration;

/// Per-call overrides an engine caller may supply: model tier, timeout,
/// and max-retries.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOverride {
    pub model_tier: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
}

/// The Agent Executor's static configuration.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Model tier name -> concrete model id.
    pub model_map: HashMap<String, String>,
    pub default_model_tier: String,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_ms: u64,
    pub max_output_tokens: u32,
    pub product_context_path: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        let mut model_map = HashMap::new();
        model_map.insert("fast".to_string(), "claude-haiku".to_string());
        model_map.insert("standard".to_string(), "claude-sonnet".to_string());
        model_map.insert("deep".to_string(), "claude-opus".to_string());
        Self {
            model_map,
            default_model_tier: "standard".to_string(),
            max_retries: 3,
            retry_delay_ms: 1000,
            timeout_ms: 120_000,
            max_output_tokens: 4096,
            product_context_path: "context/product-marketing-context.md".to_string(),
        }
    }
}

impl ExecutorConfig {
    pub fn resolve_model(&self, tier: Option<&str>) -> String {
        let tier = tier.unwrap_or(&self.default_model_tier);
        self.model_map.get(tier).cloned().unwrap_or_else(|| tier.to_string())
    }

    pub fn timeout(&self, overridden: Option<u64>) -> Duration {
        Duration::from_millis(overridden.unwrap_or(self.timeout_ms))
    }

    pub fn max_retries(&self, overridden: Option<u32>) -> u32 {
        overridden.unwrap_or(self.max_retries)
    }

    /// `retryDelayMs × 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_delay_ms.saturating_mul(1u64 << attempt.min(20)))
    }
}

/// Pipeline Engine tuning.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub default_max_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { default_max_concurrency: 3 }
    }
}
