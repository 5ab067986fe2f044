use super::*;
use mf_core::GoalId;

fn sample_goal() -> Goal {
    Goal {
        id: GoalId::from_string("goal-abc123"),
        description: "Reverse the Q3 traffic drop\nwith a multi-channel push".to_string(),
        category: "seo".to_string(),
        priority: Priority::P1,
        created_at_ms: 1_700_000_000_000,
    }
}

#[tokio::test]
async fn write_then_read_goal_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let goal = sample_goal();
    ws.write_goal(&goal).await.unwrap();
    let read_back = ws.read_goal(&goal.id).await.unwrap();
    assert_eq!(read_back, goal);
}

#[tokio::test]
async fn goal_plan_round_trips_with_dependencies() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let plan = GoalPlan {
        goal_id: GoalId::from_string("goal-abc123"),
        phases: vec![
            GoalPhase { skills: vec!["content-strategy".into()], parallel: false, depends_on_phase: None },
            GoalPhase {
                skills: vec!["copywriting".into(), "email-sequence".into()],
                parallel: true,
                depends_on_phase: Some(0),
            },
        ],
    };
    ws.write_goal_plan(&plan).await.unwrap();
    let read_back = ws.read_goal_plan(&plan.goal_id).await.unwrap();
    assert_eq!(read_back, plan);
}

#[tokio::test]
async fn missing_goal_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let err = ws.read_goal(&GoalId::from_string("goal-missing")).await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}
