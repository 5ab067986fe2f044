use super::*;

#[test]
fn fresh_run_has_no_completed_at() {
    let run = PipelineRun::new(PipelineRunId::new(), "content-cycle", None, 1000);
    assert!(run.invariant_holds());
    assert_eq!(run.current_step_index, 0);
    assert!(run.task_ids.is_empty());
}

#[test]
fn invariant_catches_completed_without_timestamp() {
    let mut run = PipelineRun::new(PipelineRunId::new(), "content-cycle", None, 1000);
    run.status = PipelineRunStatus::Completed;
    assert!(!run.invariant_holds());
    run.completed_at_ms = Some(2000);
    assert!(run.invariant_holds());
}

#[test]
fn paused_run_keeps_completed_at_null() {
    let mut run = PipelineRun::new(PipelineRunId::new(), "content-cycle", None, 1000);
    run.status = PipelineRunStatus::Paused;
    assert!(run.invariant_holds());
}

#[test]
fn step_label_reflects_variant() {
    assert_eq!(PipelineStep::Sequential { skill: "copywriting".into() }.label(), "copywriting");
    assert_eq!(
        PipelineStep::Parallel { skills: vec!["a".into(), "b".into()] }.label(),
        "a+b"
    );
    assert_eq!(PipelineStep::Review { reviewer: "director".into() }.label(), "review:director");
}

#[test]
fn pipeline_step_serializes_with_type_tag() {
    let step = PipelineStep::Parallel { skills: vec!["copywriting".into()] };
    let json = serde_json::to_string(&step).unwrap();
    assert!(json.contains("\"type\":\"parallel\""));
}
