// SPDX-License-Identifier: MIT

//! Daemon configuration, loaded from environment variables with defaults,
//! collected into one owned struct rather than free functions, since `App`
//! needs to hand it around.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

fn default_webhook_bind() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8787)
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for the durable Workspace.
    pub state_root: PathBuf,
    /// Root directory for skill prompt bodies and reference docs.
    pub skills_root: PathBuf,
    /// Address the webhook HTTP server binds to.
    pub webhook_bind: SocketAddr,
    /// Bearer token required on `POST /webhook`. `None` rejects every request.
    pub webhook_token: Option<String>,
    pub tick_interval_ms: u64,
    pub catch_up_enabled: bool,
    pub catch_up_lookback_days: u32,
    pub default_model_tier: String,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_ms: u64,
}

impl Config {
    /// Loads from `MF_*` environment variables, falling back to the same
    /// defaults `ExecutorConfig`/`SchedulerConfig` already carry.
    pub fn load() -> Self {
        let defaults_executor = mf_engine::ExecutorConfig::default();
        let defaults_scheduler = mf_scheduler::SchedulerConfig::default();

        Self {
            state_root: env_path("MF_STATE_ROOT", "./workspace"),
            skills_root: env_path("MF_SKILLS_ROOT", "./skills"),
            webhook_bind: env_var("MF_WEBHOOK_BIND")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_webhook_bind),
            webhook_token: env_var("MF_WEBHOOK_TOKEN").filter(|s| !s.is_empty()),
            tick_interval_ms: env_u64("MF_TICK_INTERVAL_MS", defaults_scheduler.tick_interval_ms),
            catch_up_enabled: env_var("MF_CATCH_UP_ENABLED")
                .map(|s| s != "false" && s != "0")
                .unwrap_or(defaults_scheduler.catch_up_enabled),
            catch_up_lookback_days: env_u64("MF_CATCH_UP_LOOKBACK_DAYS", defaults_scheduler.catch_up_lookback_days as u64) as u32,
            default_model_tier: env_var("MF_DEFAULT_MODEL_TIER").unwrap_or(defaults_executor.default_model_tier),
            max_retries: env_u64("MF_MAX_RETRIES", defaults_executor.max_retries as u64) as u32,
            retry_delay_ms: env_u64("MF_RETRY_DELAY_MS", defaults_executor.retry_delay_ms),
            timeout_ms: env_u64("MF_TIMEOUT_MS", defaults_executor.timeout_ms),
        }
    }

    pub fn executor_config(&self) -> mf_engine::ExecutorConfig {
        mf_engine::ExecutorConfig {
            default_model_tier: self.default_model_tier.clone(),
            max_retries: self.max_retries,
            retry_delay_ms: self.retry_delay_ms,
            timeout_ms: self.timeout_ms,
            ..mf_engine::ExecutorConfig::default()
        }
    }

    pub fn scheduler_config(&self) -> mf_scheduler::SchedulerConfig {
        mf_scheduler::SchedulerConfig {
            tick_interval_ms: self.tick_interval_ms,
            catch_up_enabled: self.catch_up_enabled,
            catch_up_lookback_days: self.catch_up_lookback_days,
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_path(key: &str, default: &str) -> PathBuf {
    env_var(key).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(default))
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_var(key).and_then(|s| s.parse().ok()).unwrap_or(default)
}
