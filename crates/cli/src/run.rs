// SPDX-License-Identifier: MIT

//! Dispatches a parsed [`Cli`] into one of the three invocation modes,
//! returning a plain `Result<(), ExitError>` so `main()` stays a thin
//! `std::process::exit(...)` shim (teacher's `exit_error.rs` idiom).

use crate::cli::Mode;
use crate::exit_error::ExitError;
use crate::unconfigured::{StaticBudgetProvider, UnconfiguredDirector, UnconfiguredMessageClient, UnconfiguredQueueManager};
use mf_adapters::{Director, QueueManager};
use mf_core::Priority;
use mf_daemon::{App, Config};
use mf_engine::{PipelineRunConfig, PipelineStatus};
use serde_json::json;
use std::sync::Arc;

pub async fn run(mode: Mode, priority: Priority, dry_run: bool) -> Result<(), ExitError> {
    match mode {
        Mode::Goal(description) => run_goal(description, priority, dry_run).await,
        Mode::Pipeline(template) => run_pipeline(template, priority).await,
        Mode::Daemon => run_daemon().await,
    }
}

/// Builds the process's Director and Queue Manager handles once, then wires
/// the rest of the runtime (Workspace, Executor, Pipeline Engine, Scheduler,
/// Event Bus) over them via `App::bootstrap`. The CLI keeps its own handles
/// to the two adapters `App` consumes by value, since one-shot goal/pipeline
/// modes need to call them directly rather than through the daemon loop.
fn bootstrap() -> (App, Arc<dyn Director>, Arc<dyn QueueManager>) {
    let config = Config::load();
    let director: Arc<dyn Director> = Arc::new(UnconfiguredDirector);
    let queue_manager: Arc<dyn QueueManager> = Arc::new(UnconfiguredQueueManager);
    let app = App::bootstrap(
        config,
        director.clone(),
        queue_manager.clone(),
        Arc::new(StaticBudgetProvider),
        Arc::new(UnconfiguredMessageClient),
    );
    (app, director, queue_manager)
}

/// Single-goal mode: `createGoal -> decomposeGoal -> planGoalTasks`, then
/// enqueue the resulting tasks unless `--dry-run`.
async fn run_goal(description: String, priority: Priority, dry_run: bool) -> Result<(), ExitError> {
    let (_app, director, queue_manager) = bootstrap();

    let goal = director
        .create_goal(&description, "ad-hoc", Some(priority))
        .await
        .map_err(|err| ExitError::failure(format!("failed to create goal: {err}")))?;
    let plan = director
        .decompose_goal(&goal)
        .await
        .map_err(|err| ExitError::failure(format!("failed to decompose goal: {err}")))?;
    let tasks = director
        .plan_goal_tasks(&plan, &goal)
        .await
        .map_err(|err| ExitError::failure(format!("failed to plan goal tasks: {err}")))?;

    if dry_run {
        println!("{}", json!({ "goal": goal, "plan": plan, "tasks": tasks.len() }));
        return Ok(());
    }

    queue_manager
        .enqueue_batch(&tasks)
        .await
        .map_err(|err| ExitError::failure(format!("failed to enqueue goal tasks: {err}")))?;

    println!("{}", json!({ "goal": goal, "tasksEnqueued": tasks.len() }));
    Ok(())
}

/// One-shot pipeline mode: `Director::start_pipeline` for the run's initial
/// activation, then drive it to completion with the Pipeline Engine,
/// exactly as the CLI stands in for the missing queue-worker process
/// (see `mf_engine::pipeline`'s module doc).
async fn run_pipeline(template: String, priority: Priority) -> Result<(), ExitError> {
    let (app, director, _queue_manager) = bootstrap();

    let started = director
        .start_pipeline(&template, &template, priority)
        .await
        .map_err(|err| ExitError::failure(format!("failed to start pipeline {template}: {err}")))?;

    let result = app
        .pipeline_engine
        .execute(
            &started.definition,
            started.run,
            PipelineRunConfig { goal_description: template.clone(), priority, ..PipelineRunConfig::default() },
        )
        .await;

    let succeeded = matches!(result.status, PipelineStatus::Completed);
    println!(
        "{}",
        json!({
            "pipeline": template,
            "status": format!("{:?}", result.status),
            "stepsCompleted": result.step_results.len(),
            "error": result.error.map(|e| e.to_string()),
        })
    );

    if succeeded {
        Ok(())
    } else {
        Err(ExitError::failure(format!("pipeline {template} did not complete")))
    }
}

/// `--daemon`: run the scheduler tick loop and webhook server indefinitely,
/// until SIGINT/SIGTERM. No schedules or event mappings are
/// registered here — registering them is an operator action outside this
/// spec's scope; `App::start` is still called with empty lists so the
/// scheduler's catch-up pass runs before the tick loop starts.
async fn run_daemon() -> Result<(), ExitError> {
    let (app, _director, _queue_manager) = bootstrap();
    let app = Arc::new(app);
    app.start(Vec::new(), Vec::new()).await;

    let shutdown_app = app.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        shutdown_app.shutdown();
    });

    app.run_daemon().await.map_err(|err| ExitError::failure(format!("daemon exited: {err}")))
}
