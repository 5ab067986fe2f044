use super::*;
use crate::config::ExecutorConfig;
use mf_adapters::fakes::FakeMessageClient;
use mf_adapters::{CompletionResponse, Logger, StopReason};
use mf_core::{FakeClock, PipelineDefinition, PipelineRun, PipelineRunId, PipelineTrigger};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

async fn skills_dir(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        tokio::fs::write(dir.path().join(format!("{name}.md")), format!("Prompt for {name}.")).await.unwrap();
    }
    dir
}

fn engine(
    ws_root: &std::path::Path,
    skills_root: &std::path::Path,
    client: Arc<FakeMessageClient>,
) -> PipelineEngine<FakeClock> {
    let workspace = mf_workspace::Workspace::new(ws_root);
    let executor = Arc::new(AgentExecutor::new(
        workspace.clone(),
        mf_adapters::SkillRegistry::new(skills_root),
        client,
        FakeClock::new(),
        Logger::new(),
        ExecutorConfig { retry_delay_ms: 1, ..ExecutorConfig::default() },
    ));
    PipelineEngine::new(workspace, executor, FakeClock::new(), PipelineConfig::default())
}

fn definition(id: &str, steps: Vec<PipelineStep>) -> PipelineDefinition {
    PipelineDefinition {
        id: id.to_string(),
        name: id.to_string(),
        description: String::new(),
        steps,
        default_priority: Priority::P2,
        trigger: PipelineTrigger::Manual,
    }
}

fn fresh_run(pipeline_id: &str) -> PipelineRun {
    PipelineRun::new(PipelineRunId::new(), pipeline_id, None, 0)
}

#[tokio::test]
async fn three_step_sequential_pipeline_completes() {
    let ws_dir = tempfile::tempdir().unwrap();
    let skills = skills_dir(&["content-strategy", "copywriting", "copy-editing"]).await;
    let client = Arc::new(FakeMessageClient::with_responses(vec![CompletionResponse {
        content: "draft".to_string(),
        input_tokens: 100,
        output_tokens: 200,
        stop_reason: StopReason::EndTurn,
    }]));
    let engine = engine(ws_dir.path(), skills.path(), client.clone());

    let def = definition(
        "content-sequence",
        vec![
            PipelineStep::Sequential { skill: "content-strategy".to_string() },
            PipelineStep::Sequential { skill: "copywriting".to_string() },
            PipelineStep::Sequential { skill: "copy-editing".to_string() },
        ],
    );
    let run = fresh_run("content-sequence");

    let result = engine.execute(&def, run, PipelineRunConfig::default()).await;

    assert_eq!(result.status, PipelineStatus::Completed);
    assert_eq!(client.call_count(), 3);
    assert_eq!(result.run.task_ids.len(), 3);
    assert_eq!(result.tokens_used.input, 300);
    assert_eq!(result.tokens_used.output, 600);
    assert_eq!(result.tokens_used.total(), 900);

    let second_task_id = &result.run.task_ids[1];
    let second_task = mf_workspace::Workspace::new(ws_dir.path())
        .read_task(&mf_core::TaskId::from_string(second_task_id))
        .await
        .unwrap();
    assert!(second_task.inputs.iter().any(|i| i.path.starts_with("outputs/strategy/content-strategy/")));
}

#[tokio::test]
async fn parallel_step_respects_concurrency_cap_and_preserves_order() {
    let ws_dir = tempfile::tempdir().unwrap();
    let skills = skills_dir(&["copywriting", "email-sequence", "social-content", "paid-ads"]).await;
    let client = Arc::new(FakeMessageClient::new().with_delay(Duration::from_millis(40)));
    let engine = engine(ws_dir.path(), skills.path(), client.clone());

    let def = definition(
        "multi-channel",
        vec![PipelineStep::Parallel {
            skills: vec![
                "copywriting".to_string(),
                "email-sequence".to_string(),
                "social-content".to_string(),
                "paid-ads".to_string(),
            ],
        }],
    );
    let run = fresh_run("multi-channel");
    let config = PipelineRunConfig { max_concurrency: Some(2), ..PipelineRunConfig::default() };

    let result = engine.execute(&def, run, config).await;

    assert_eq!(result.status, PipelineStatus::Completed);
    assert!(client.max_in_flight() <= 2);
    assert_eq!(result.run.task_ids.len(), 4);
    let step = &result.step_results[0];
    assert_eq!(step.output_paths.len(), 4);
    assert!(step.output_paths[0].contains("copywriting"));
    assert!(step.output_paths[1].contains("email-sequence"));
    assert!(step.output_paths[2].contains("social-content"));
    assert!(step.output_paths[3].contains("paid-ads"));
}

#[tokio::test]
async fn review_step_pauses_and_resumes() {
    let ws_dir = tempfile::tempdir().unwrap();
    let skills = skills_dir(&["content-strategy", "copywriting", "copy-editing"]).await;
    let client = Arc::new(FakeMessageClient::new());
    let engine = engine(ws_dir.path(), skills.path(), client.clone());

    let def = definition(
        "reviewed-sequence",
        vec![
            PipelineStep::Sequential { skill: "content-strategy".to_string() },
            PipelineStep::Sequential { skill: "copywriting".to_string() },
            PipelineStep::Review { reviewer: "director".to_string() },
            PipelineStep::Sequential { skill: "copy-editing".to_string() },
        ],
    );
    let run = fresh_run("reviewed-sequence");

    let first = engine.execute(&def, run, PipelineRunConfig::default()).await;
    assert_eq!(first.status, PipelineStatus::Paused);
    assert_eq!(first.run.current_step_index, 2);
    assert!(first.run.completed_at_ms.is_none());
    assert_eq!(first.error.unwrap().code(), "PAUSED_FOR_REVIEW");
    assert_eq!(client.call_count(), 2);

    let resumed_inputs = first.step_results.last().unwrap().output_paths.clone();
    let resume_config = PipelineRunConfig { initial_input_paths: resumed_inputs, ..PipelineRunConfig::default() };
    let second = engine.execute(&def, first.run, resume_config).await;

    assert_eq!(second.status, PipelineStatus::Completed);
    assert_eq!(second.run.status, PipelineRunStatus::Completed);
    assert_eq!(client.call_count(), 3);
    assert_eq!(second.step_results.len(), 1);
}

#[tokio::test]
async fn trailing_review_as_last_step_completes_with_no_extra_work() {
    let ws_dir = tempfile::tempdir().unwrap();
    let skills = skills_dir(&["content-strategy"]).await;
    let client = Arc::new(FakeMessageClient::new());
    let engine = engine(ws_dir.path(), skills.path(), client.clone());

    let def = definition(
        "trailing-review",
        vec![
            PipelineStep::Sequential { skill: "content-strategy".to_string() },
            PipelineStep::Review { reviewer: "director".to_string() },
        ],
    );
    let run = fresh_run("trailing-review");

    let first = engine.execute(&def, run, PipelineRunConfig::default()).await;
    assert_eq!(first.status, PipelineStatus::Paused);

    let second = engine.execute(&def, first.run, PipelineRunConfig::default()).await;
    assert_eq!(second.status, PipelineStatus::Completed);
    assert!(second.step_results.is_empty());
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn already_running_status_is_rejected_without_mutating_run() {
    let ws_dir = tempfile::tempdir().unwrap();
    let skills = skills_dir(&["content-strategy"]).await;
    let client = Arc::new(FakeMessageClient::new());
    let engine = engine(ws_dir.path(), skills.path(), client);

    let def = definition("x", vec![PipelineStep::Sequential { skill: "content-strategy".to_string() }]);
    let mut run = fresh_run("x");
    run.status = PipelineRunStatus::Running;

    let result = engine.execute(&def, run.clone(), PipelineRunConfig::default()).await;
    assert_eq!(result.status, PipelineStatus::Failed);
    assert_eq!(result.error.unwrap().code(), "ALREADY_RUNNING");
    assert_eq!(result.run.status, run.status);
    assert_eq!(result.run.current_step_index, run.current_step_index);
}

#[tokio::test]
async fn empty_steps_fails_the_run() {
    let ws_dir = tempfile::tempdir().unwrap();
    let skills = skills_dir(&[]).await;
    let client = Arc::new(FakeMessageClient::new());
    let engine = engine(ws_dir.path(), skills.path(), client);

    let def = definition("empty", Vec::new());
    let run = fresh_run("empty");

    let result = engine.execute(&def, run, PipelineRunConfig::default()).await;
    assert_eq!(result.status, PipelineStatus::Failed);
    assert_eq!(result.error.unwrap().code(), "NO_STEPS");
    assert_eq!(result.run.status, PipelineRunStatus::Failed);
    assert!(result.run.completed_at_ms.is_some());
}

#[tokio::test]
async fn sequential_step_failure_fails_the_run_and_stops() {
    let ws_dir = tempfile::tempdir().unwrap();
    let skills = skills_dir(&["content-strategy", "copywriting"]).await;
    let client = Arc::new(FakeMessageClient::new());
    client.fail_always(mf_adapters::ExecError::ResponseEmpty);
    let engine = engine(ws_dir.path(), skills.path(), client.clone());

    let def = definition(
        "will-fail",
        vec![
            PipelineStep::Sequential { skill: "content-strategy".to_string() },
            PipelineStep::Sequential { skill: "copywriting".to_string() },
        ],
    );
    let run = fresh_run("will-fail");

    let result = engine.execute(&def, run, PipelineRunConfig::default()).await;
    assert_eq!(result.status, PipelineStatus::Failed);
    assert_eq!(result.run.status, PipelineRunStatus::Failed);
    assert_eq!(client.call_count(), 1);
    assert_eq!(result.run.task_ids.len(), 1);
}

#[tokio::test]
async fn step_complete_callback_fires_for_successful_steps_only() {
    let ws_dir = tempfile::tempdir().unwrap();
    let skills = skills_dir(&["content-strategy"]).await;
    let client = Arc::new(FakeMessageClient::new());
    let engine = engine(ws_dir.path(), skills.path(), client);

    let def = definition("single", vec![PipelineStep::Sequential { skill: "content-strategy".to_string() }]);
    let run = fresh_run("single");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let config = PipelineRunConfig {
        on_step_complete: Some(Box::new(move |result: &StepResult| {
            seen_clone.lock().push(result.label.clone());
        })),
        ..PipelineRunConfig::default()
    };

    let result = engine.execute(&def, run, config).await;
    assert_eq!(result.status, PipelineStatus::Completed);
    assert_eq!(*seen.lock(), vec!["content-strategy".to_string()]);
}

#[tokio::test]
async fn status_change_callback_fires_on_failure_after_completed_at_is_set() {
    let ws_dir = tempfile::tempdir().unwrap();
    let skills = skills_dir(&["content-strategy"]).await;
    let client = Arc::new(FakeMessageClient::new());
    client.fail_always(mf_adapters::ExecError::ResponseEmpty);
    let engine = engine(ws_dir.path(), skills.path(), client);

    let def = definition("will-fail", vec![PipelineStep::Sequential { skill: "content-strategy".to_string() }]);
    let run = fresh_run("will-fail");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let config = PipelineRunConfig {
        on_status_change: Some(Box::new(move |status: PipelineRunStatus| {
            seen_clone.lock().push(status);
        })),
        ..PipelineRunConfig::default()
    };

    let result = engine.execute(&def, run, config).await;
    assert_eq!(result.status, PipelineStatus::Failed);
    assert!(result.run.completed_at_ms.is_some());
    assert_eq!(*seen.lock(), vec![PipelineRunStatus::Running, PipelineRunStatus::Failed]);
}

#[tokio::test]
async fn status_change_callback_fires_on_pause_for_review() {
    let ws_dir = tempfile::tempdir().unwrap();
    let skills = skills_dir(&[]).await;
    let client = Arc::new(FakeMessageClient::new());
    let engine = engine(ws_dir.path(), skills.path(), client);

    let def = definition("with-review", vec![PipelineStep::Review { reviewer: "director".to_string() }]);
    let run = fresh_run("with-review");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let config = PipelineRunConfig {
        on_status_change: Some(Box::new(move |status: PipelineRunStatus| {
            seen_clone.lock().push(status);
        })),
        ..PipelineRunConfig::default()
    };

    let result = engine.execute(&def, run, config).await;
    assert_eq!(result.status, PipelineStatus::Paused);
    assert_eq!(*seen.lock(), vec![PipelineRunStatus::Running, PipelineRunStatus::Paused]);
}
