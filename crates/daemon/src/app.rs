// SPDX-License-Identifier: MIT

//! `App` composition root: the runtime is a composition of values,
//! constructed by `bootstrap(config)` and shut down via `app.shutdown()`.
//! No process-wide singleton — acquire resources, load durable state, wire
//! adapters, return a handle, scaled to this crate's four core subsystems.

use crate::config::Config;
use crate::webhook;
use mf_adapters::{BudgetProvider, Director, Logger, MessageClient, QueueManager, SkillRegistry};
use mf_core::{CancelToken, SystemClock};
use mf_engine::{AgentExecutor, PipelineEngine};
use mf_eventbus::{EventBus, EventMapping};
use mf_scheduler::Scheduler;
use mf_workspace::Workspace;
use std::sync::Arc;

/// Everything the daemon loop (`--daemon`) and one-shot CLI invocations
/// (`--pipeline`, bare goal string) share. Values, not a singleton: tests
/// build their own `App` with fake adapters and an in-memory clock-free
/// `Workspace` rooted in a `tempdir`.
pub struct App {
    pub workspace: Workspace,
    pub executor: Arc<AgentExecutor<SystemClock>>,
    pub pipeline_engine: Arc<PipelineEngine<SystemClock>>,
    pub scheduler: Arc<Scheduler<SystemClock>>,
    pub event_bus: Arc<EventBus<SystemClock>>,
    pub logger: Logger,
    pub config: Config,
    cancel: CancelToken,
}

impl App {
    /// Wires the four core subsystems over a shared `Workspace`, in dependency
    /// order: Workspace -> {Agent Executor, Scheduler state} -> Pipeline Engine
    /// -> {Scheduler, Event Bus}.
    #[allow(clippy::too_many_arguments)]
    pub fn bootstrap(
        config: Config,
        director: Arc<dyn Director>,
        queue_manager: Arc<dyn QueueManager>,
        budget: Arc<dyn BudgetProvider>,
        message_client: Arc<dyn MessageClient>,
    ) -> Self {
        let logger = Logger::new();
        let workspace = Workspace::new(config.state_root.clone());
        let skills = SkillRegistry::new(config.skills_root.clone());

        let executor = Arc::new(AgentExecutor::new(
            workspace.clone(),
            skills,
            message_client,
            SystemClock,
            logger.child(&[("module", "executor")]),
            config.executor_config(),
        ));

        let pipeline_engine = Arc::new(PipelineEngine::new(
            workspace.clone(),
            executor.clone(),
            SystemClock,
            mf_engine::PipelineConfig::default(),
        ));

        let scheduler = Arc::new(Scheduler::new(
            workspace.clone(),
            director.clone(),
            budget,
            SystemClock,
            logger.child(&[("module", "scheduler")]),
            config.scheduler_config(),
        ));

        let event_bus =
            Arc::new(EventBus::new(director, queue_manager, SystemClock, logger.child(&[("module", "eventbus")])));

        Self {
            workspace,
            executor,
            pipeline_engine,
            scheduler,
            event_bus,
            logger,
            config,
            cancel: CancelToken::new(),
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Register the schedules and event mappings an operator configured.
    /// Kept separate from `bootstrap` so tests can register a handful of
    /// fixtures without constructing a full config file loader.
    pub async fn start(&self, schedules: Vec<mf_core::ScheduleEntry>, mappings: Vec<EventMapping>) -> mf_scheduler::StartReport {
        for mapping in mappings {
            self.event_bus.add_mapping(mapping);
        }
        self.scheduler.start(schedules).await
    }

    /// Runs the daemon loop indefinitely: the scheduler's
    /// tick loop plus the webhook HTTP server, both bound to the same
    /// cancellation token, until `shutdown()` is called or the process
    /// receives SIGINT/SIGTERM.
    pub async fn run_daemon(self: &Arc<Self>) -> std::io::Result<()> {
        let scheduler_app = self.clone();
        let scheduler_cancel = self.cancel.clone();
        let scheduler_task = tokio::spawn(async move {
            scheduler_app.scheduler.run(scheduler_cancel).await;
        });

        let webhook_result = webhook::serve(self.clone(), self.cancel.clone()).await;

        self.cancel.cancel();
        let _ = scheduler_task.await;
        webhook_result
    }

    /// Signals every in-flight loop to stop. Idempotent.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_adapters::fakes::{FakeBudgetProvider, FakeDirector, FakeMessageClient, FakeQueueManager};

    #[tokio::test]
    async fn bootstrap_wires_every_subsystem_over_one_workspace_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            state_root: dir.path().to_path_buf(),
            skills_root: dir.path().join("skills"),
            webhook_bind: "127.0.0.1:0".parse().unwrap(),
            webhook_token: Some("secret".to_string()),
            tick_interval_ms: 60_000,
            catch_up_enabled: false,
            catch_up_lookback_days: 31,
            default_model_tier: "standard".to_string(),
            max_retries: 3,
            retry_delay_ms: 10,
            timeout_ms: 5_000,
        };

        let app = App::bootstrap(
            config,
            Arc::new(FakeDirector::new()),
            Arc::new(FakeQueueManager::new()),
            Arc::new(FakeBudgetProvider::always_normal()),
            Arc::new(FakeMessageClient::new()),
        );

        assert_eq!(app.workspace.root(), dir.path());
        assert!(!app.cancel_token().is_cancelled());
    }

    #[tokio::test]
    async fn shutdown_is_idempotent_and_observable_via_cancel_token() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            state_root: dir.path().to_path_buf(),
            skills_root: dir.path().join("skills"),
            webhook_bind: "127.0.0.1:0".parse().unwrap(),
            webhook_token: None,
            tick_interval_ms: 60_000,
            catch_up_enabled: false,
            catch_up_lookback_days: 31,
            default_model_tier: "standard".to_string(),
            max_retries: 3,
            retry_delay_ms: 10,
            timeout_ms: 5_000,
        };
        let app = App::bootstrap(
            config,
            Arc::new(FakeDirector::new()),
            Arc::new(FakeQueueManager::new()),
            Arc::new(FakeBudgetProvider::always_normal()),
            Arc::new(FakeMessageClient::new()),
        );

        let cancel = app.cancel_token();
        app.shutdown();
        app.shutdown();
        assert!(cancel.is_cancelled());
    }
}
