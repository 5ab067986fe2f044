use super::*;
use serde_json::json;

fn sample() -> HumanReviewItem {
    HumanReviewItem {
        id: HumanReviewId::from_string("hrv-xyz"),
        task_id: "copywriting-20260216-abcdef".into(),
        skill: "copywriting".into(),
        created_at_ms: 1_700_000_000_000,
        urgency: Urgency::High,
        status: HumanReviewStatus::Pending,
        escalation_reason: "Two consecutive REVISE verdicts".into(),
        goal_id: Some("goal-abc".into()),
        pipeline_id: Some("run-def".into()),
        feedback_decision: None,
        feedback_reviewer: None,
        resolved_at_ms: None,
        metadata: Some(json!({"attempt": 3})),
        escalation_context: Some(json!({"previous_verdicts": ["REVISE", "REVISE"]})),
        feedback_notes: None,
        revision_instructions: None,
    }
}

#[tokio::test]
async fn write_then_read_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let item = sample();
    ws.write_human_review(&item).await.unwrap();
    let read_back = ws.read_human_review(&item.id).await.unwrap();
    assert_eq!(read_back, item);
}

#[tokio::test]
async fn update_applies_feedback_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let item = sample();
    ws.write_human_review(&item).await.unwrap();

    let updated = ws
        .update_human_review(&item.id, |i| {
            i.status = HumanReviewStatus::Resolved;
            i.feedback_decision = Some("approved".into());
            i.feedback_reviewer = Some("alice".into());
            i.resolved_at_ms = Some(1_700_000_500_000);
            i.feedback_notes = Some("Looks good now.".into());
            i.revision_instructions = Some("Tighten the CTA.".into());
        })
        .await
        .unwrap();

    assert_eq!(updated.status, HumanReviewStatus::Resolved);

    let read_back = ws.read_human_review(&item.id).await.unwrap();
    assert_eq!(read_back.status, HumanReviewStatus::Resolved);
    assert_eq!(read_back.feedback_decision.as_deref(), Some("approved"));
    assert_eq!(read_back.feedback_notes.as_deref(), Some("Looks good now."));
    assert_eq!(read_back.revision_instructions.as_deref(), Some("Tighten the CTA."));
}

#[tokio::test]
async fn list_human_reviews_returns_all() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let mut a = sample();
    a.id = HumanReviewId::from_string("hrv-a");
    let mut b = sample();
    b.id = HumanReviewId::from_string("hrv-b");
    ws.write_human_review(&a).await.unwrap();
    ws.write_human_review(&b).await.unwrap();

    let items = ws.list_human_reviews().await.unwrap();
    assert_eq!(items.len(), 2);
}
