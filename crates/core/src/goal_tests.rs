use super::*;

#[test]
fn goal_plan_round_trips_through_json() {
    let plan = GoalPlan {
        goal_id: GoalId::new(),
        phases: vec![
            GoalPhase { skills: vec!["content-strategy".into()], parallel: false, depends_on_phase: None },
            GoalPhase {
                skills: vec!["copywriting".into(), "social-content".into()],
                parallel: true,
                depends_on_phase: Some(0),
            },
        ],
    };
    let json = serde_json::to_string(&plan).unwrap();
    let back: GoalPlan = serde_json::from_str(&json).unwrap();
    assert_eq!(plan, back);
}
