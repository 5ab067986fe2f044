use super::*;
use mf_adapters::fakes::{FakeBudgetProvider, FakeDirector};
use mf_adapters::{Director, DirectorError, StartPipelineResult};
use mf_core::{
    BudgetLevel, BudgetState, FakeClock, PipelineDefinition, PipelineRun, PipelineRunId, PipelineTrigger,
};
use std::time::Duration;

const DAILY_SIX_AM_MATCH_MS: u64 = 1_771_221_600_000; // 2026-02-16T06:00:00Z
const PREVIOUS_DAY_SIX_AM_MS: u64 = 1_771_135_200_000; // 2026-02-15T06:00:00Z
const LATE_MORNING_MS: u64 = 1_771_236_000_000; // 2026-02-16T10:00:00Z

fn entry(id: &str, cron: &str, pipeline_id: &str, priority: Priority) -> ScheduleEntry {
    ScheduleEntry {
        id: id.to_string(),
        name: id.to_string(),
        cron: cron.to_string(),
        pipeline_id: pipeline_id.to_string(),
        enabled: true,
        priority,
        goal_category: None,
        description: format!("{id} run"),
    }
}

fn start_result(pipeline_id: &str, now_ms: u64) -> StartPipelineResult {
    let definition = PipelineDefinition {
        id: pipeline_id.to_string(),
        name: pipeline_id.to_string(),
        description: String::new(),
        steps: Vec::new(),
        default_priority: Priority::P2,
        trigger: PipelineTrigger::Manual,
    };
    let run = PipelineRun::new(PipelineRunId::new(), pipeline_id, None, now_ms);
    StartPipelineResult { definition, run, tasks: Vec::new() }
}

fn always_allows() -> Arc<dyn BudgetProvider> {
    Arc::new(FakeBudgetProvider::always_normal())
}

#[tokio::test]
async fn cron_dedup_within_the_same_minute() {
    let ws_dir = tempfile::tempdir().unwrap();
    let workspace = mf_workspace::Workspace::new(ws_dir.path());
    let director = Arc::new(FakeDirector::new());
    let director_dyn: Arc<dyn Director> = director.clone();
    let clock = FakeClock::new();
    clock.set_epoch_ms(DAILY_SIX_AM_MATCH_MS);

    let scheduler = Scheduler::new(
        workspace,
        director_dyn,
        always_allows(),
        clock,
        Logger::new(),
        SchedulerConfig { catch_up_enabled: false, ..SchedulerConfig::default() },
    );
    scheduler.start(vec![entry("daily-seo", "0 6 * * *", "seo-pipeline", Priority::P2)]).await;

    director.queue_result(Ok(start_result("seo-pipeline", DAILY_SIX_AM_MATCH_MS)));
    let first = scheduler.tick().await;
    assert_eq!(first.fired.len(), 1);
    assert_eq!(first.fired[0].schedule_id, "daily-seo");

    let second = scheduler.tick().await;
    assert!(second.fired.is_empty());
    assert_eq!(second.skipped.len(), 1);
    assert_eq!(second.skipped[0].schedule_id, "daily-seo");
    assert_eq!(second.skipped[0].reason, "already_fired_this_minute");
}

#[tokio::test]
async fn catch_up_fires_once_using_the_missed_cron_time() {
    let ws_dir = tempfile::tempdir().unwrap();
    let workspace = mf_workspace::Workspace::new(ws_dir.path());
    workspace
        .write_schedule_state(&ScheduleState {
            schedule_id: "daily-seo2".to_string(),
            last_fired_at_ms: Some(PREVIOUS_DAY_SIX_AM_MS),
            last_skip_reason: None,
            fire_count: 5,
        })
        .await
        .unwrap();

    let director = Arc::new(FakeDirector::new());
    let director_dyn: Arc<dyn Director> = director.clone();
    let clock = FakeClock::new();
    clock.set_epoch_ms(LATE_MORNING_MS);

    let scheduler = Scheduler::new(
        workspace.clone(),
        director_dyn,
        always_allows(),
        clock,
        Logger::new(),
        SchedulerConfig { catch_up_enabled: true, ..SchedulerConfig::default() },
    );

    director.queue_result(Ok(start_result("seo-pipeline", LATE_MORNING_MS)));
    let report = scheduler.start(vec![entry("daily-seo2", "0 6 * * *", "seo-pipeline", Priority::P2)]).await;

    assert_eq!(report.catch_up.fired.len(), 1);
    assert_eq!(report.catch_up.fired[0].schedule_id, "daily-seo2");

    let persisted = workspace.read_schedule_state("daily-seo2").await.unwrap();
    assert_eq!(persisted.fire_count, 6);
    assert_eq!(persisted.last_fired_at_ms, Some(DAILY_SIX_AM_MATCH_MS));
}

#[tokio::test]
async fn disabled_schedule_is_skipped_without_calling_director() {
    let ws_dir = tempfile::tempdir().unwrap();
    let workspace = mf_workspace::Workspace::new(ws_dir.path());
    let director = Arc::new(FakeDirector::new());
    let director_dyn: Arc<dyn Director> = director.clone();
    let clock = FakeClock::new();
    clock.set_epoch_ms(DAILY_SIX_AM_MATCH_MS);

    let scheduler = Scheduler::new(
        workspace,
        director_dyn,
        always_allows(),
        clock,
        Logger::new(),
        SchedulerConfig { catch_up_enabled: false, ..SchedulerConfig::default() },
    );
    let mut disabled = entry("daily-seo", "0 6 * * *", "seo-pipeline", Priority::P2);
    disabled.enabled = false;
    scheduler.start(vec![disabled]).await;

    let report = scheduler.tick().await;
    assert!(report.fired.is_empty());
    assert_eq!(report.skipped, vec![SkippedEntry { schedule_id: "daily-seo".to_string(), reason: "disabled".to_string() }]);
    assert!(director.start_pipeline_calls.lock().is_empty());
}

#[tokio::test]
async fn budget_gate_blocks_firing_for_disallowed_priority() {
    let ws_dir = tempfile::tempdir().unwrap();
    let workspace = mf_workspace::Workspace::new(ws_dir.path());
    let director = Arc::new(FakeDirector::new());
    let director_dyn: Arc<dyn Director> = director.clone();
    let clock = FakeClock::new();
    clock.set_epoch_ms(DAILY_SIX_AM_MATCH_MS);

    let budget: Arc<dyn BudgetProvider> = Arc::new(FakeBudgetProvider::new(BudgetState {
        total_budget: 100.0,
        spent: 95.0,
        percent_used: 95.0,
        level: BudgetLevel::Critical,
        allowed_priorities: vec![Priority::P0],
        model_override: None,
    }));

    let scheduler = Scheduler::new(
        workspace,
        director_dyn,
        budget,
        clock,
        Logger::new(),
        SchedulerConfig { catch_up_enabled: false, ..SchedulerConfig::default() },
    );
    scheduler.start(vec![entry("daily-seo", "0 6 * * *", "seo-pipeline", Priority::P2)]).await;

    let report = scheduler.tick().await;
    assert!(report.fired.is_empty());
    assert_eq!(report.skipped[0].reason, "budget_critical");
    assert!(director.start_pipeline_calls.lock().is_empty());
}

#[tokio::test]
async fn mark_completed_releases_the_overlap_gate() {
    let ws_dir = tempfile::tempdir().unwrap();
    let workspace = mf_workspace::Workspace::new(ws_dir.path());
    let director = Arc::new(FakeDirector::new());
    let director_dyn: Arc<dyn Director> = director.clone();
    let clock = FakeClock::new();
    clock.set_epoch_ms(DAILY_SIX_AM_MATCH_MS);

    let scheduler = Scheduler::new(
        workspace,
        director_dyn,
        always_allows(),
        clock.clone(),
        Logger::new(),
        SchedulerConfig { catch_up_enabled: false, ..SchedulerConfig::default() },
    );
    scheduler.start(vec![entry("every-minute", "* * * * *", "seo-pipeline", Priority::P2)]).await;

    director.queue_result(Ok(start_result("seo-pipeline", DAILY_SIX_AM_MATCH_MS)));
    let first = scheduler.tick().await;
    assert_eq!(first.fired.len(), 1);

    clock.advance(Duration::from_secs(60));
    let still_running = scheduler.tick().await;
    assert!(still_running.fired.is_empty());
    assert_eq!(still_running.skipped[0].reason, "pipeline_still_running");

    scheduler.mark_completed("every-minute");
    director.queue_result(Ok(start_result("seo-pipeline", DAILY_SIX_AM_MATCH_MS + 60_000)));
    let after_mark_completed = scheduler.tick().await;
    assert_eq!(after_mark_completed.fired.len(), 1);
}

#[tokio::test]
async fn fire_error_is_reported_as_a_skip_not_a_panic() {
    let ws_dir = tempfile::tempdir().unwrap();
    let workspace = mf_workspace::Workspace::new(ws_dir.path());
    let director = Arc::new(FakeDirector::new());
    let director_dyn: Arc<dyn Director> = director.clone();
    let clock = FakeClock::new();
    clock.set_epoch_ms(DAILY_SIX_AM_MATCH_MS);

    let scheduler = Scheduler::new(
        workspace,
        director_dyn,
        always_allows(),
        clock,
        Logger::new(),
        SchedulerConfig { catch_up_enabled: false, ..SchedulerConfig::default() },
    );
    scheduler.start(vec![entry("daily-seo", "0 6 * * *", "missing-template", Priority::P2)]).await;

    director.queue_result(Err(DirectorError::UnknownTemplate("missing-template".to_string())));
    let report = scheduler.tick().await;
    assert!(report.fired.is_empty());
    assert!(report.skipped[0].reason.starts_with("fire_error:"));
}

#[tokio::test]
async fn get_next_firing_scans_forward_to_the_next_match() {
    let ws_dir = tempfile::tempdir().unwrap();
    let workspace = mf_workspace::Workspace::new(ws_dir.path());
    let director = Arc::new(FakeDirector::new());
    let director_dyn: Arc<dyn Director> = director.clone();
    let clock = FakeClock::new();
    clock.set_epoch_ms(LATE_MORNING_MS);

    let scheduler = Scheduler::new(
        workspace,
        director_dyn,
        always_allows(),
        clock,
        Logger::new(),
        SchedulerConfig { catch_up_enabled: false, ..SchedulerConfig::default() },
    );
    scheduler.start(vec![entry("daily-seo", "0 6 * * *", "seo-pipeline", Priority::P2)]).await;

    let next = scheduler.get_next_firing("daily-seo").unwrap();
    assert_eq!(next.format("%H:%M").to_string(), "06:00");
    assert!(next > datetime_from_epoch_ms(LATE_MORNING_MS));
}
