use super::*;
use mf_core::{RevisionPriority, Severity};

fn sample_review() -> Review {
    Review {
        id: ReviewId::from_string("rev-abc123"),
        task_id: "copywriting-20260216-abcdef".into(),
        created_at_ms: 1_700_000_000_000,
        reviewer: "director".into(),
        author: "copywriting".into(),
        verdict: Verdict::Revise,
        summary: "Good direction, needs a stronger close.".into(),
        findings: vec![Finding {
            severity: Severity::Major,
            section: "CTA".into(),
            description: "No urgency in the final paragraph.".into(),
        }],
        revision_requests: vec![RevisionRequest {
            priority: RevisionPriority::Required,
            description: "Add a deadline-driven CTA.".into(),
        }],
    }
}

#[tokio::test]
async fn write_then_read_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let review = sample_review();
    let path = ws.write_review(&review).await.unwrap();
    assert_eq!(path, "reviews/copywriting-20260216-abcdef-review.md");
    let read_back = ws.read_review(&path).await.unwrap();
    assert_eq!(read_back, review);
}

#[tokio::test]
async fn second_review_for_same_task_gets_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let first = sample_review();
    ws.write_review(&first).await.unwrap();

    let mut second = sample_review();
    second.id = ReviewId::from_string("rev-def456");
    second.verdict = Verdict::Approve;
    let path = ws.write_review(&second).await.unwrap();
    assert_eq!(path, "reviews/copywriting-20260216-abcdef-review-2.md");
}

#[tokio::test]
async fn list_reviews_ordered_oldest_first() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let mut first = sample_review();
    first.verdict = Verdict::Revise;
    ws.write_review(&first).await.unwrap();

    let mut second = sample_review();
    second.id = ReviewId::from_string("rev-def456");
    second.verdict = Verdict::Approve;
    ws.write_review(&second).await.unwrap();

    let reviews = ws.list_reviews("copywriting-20260216-abcdef").await.unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].verdict, Verdict::Revise);
    assert_eq!(reviews[1].verdict, Verdict::Approve);
}

#[tokio::test]
async fn no_findings_or_revisions_round_trips_with_empty_vecs() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let mut review = sample_review();
    review.findings.clear();
    review.revision_requests.clear();
    review.verdict = Verdict::Approve;
    let path = ws.write_review(&review).await.unwrap();
    let read_back = ws.read_review(&path).await.unwrap();
    assert_eq!(read_back, review);
}
