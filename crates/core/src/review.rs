// SPDX-License-Identifier: MIT

//! Review records, human-escalation items, learnings, and cost entries.
//!
//! Fields fixed per the on-disk frontmatter-key enumeration these records
//! share with their markdown rendering.

use serde::{Deserialize, Serialize};

crate::define_id! {
    pub struct ReviewId("rev-");
}

crate::define_id! {
    pub struct HumanReviewId("hrv-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Approve,
    Revise,
    Reject,
}

crate::simple_display! {
    Verdict {
        Approve => "APPROVE",
        Revise => "REVISE",
        Reject => "REJECT",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
    Suggestion,
}

crate::simple_display! {
    Severity {
        Critical => "critical",
        Major => "major",
        Minor => "minor",
        Suggestion => "suggestion",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionPriority {
    Required,
    Recommended,
    Optional,
}

crate::simple_display! {
    RevisionPriority {
        Required => "required",
        Recommended => "recommended",
        Optional => "optional",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub section: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRequest {
    pub priority: RevisionPriority,
    pub description: String,
}

/// Agent-to-agent review of a completed task's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub task_id: String,
    pub created_at_ms: u64,
    pub reviewer: String,
    pub author: String,
    pub verdict: Verdict,
    pub summary: String,
    pub findings: Vec<Finding>,
    pub revision_requests: Vec<RevisionRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Critical,
    High,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HumanReviewStatus {
    Pending,
    InReview,
    Resolved,
    Expired,
}

crate::simple_display! {
    HumanReviewStatus {
        Pending => "pending",
        InReview => "in_review",
        Resolved => "resolved",
        Expired => "expired",
    }
}

/// An escalation to a human reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanReviewItem {
    pub id: HumanReviewId,
    pub task_id: String,
    pub skill: String,
    pub created_at_ms: u64,
    pub urgency: Urgency,
    pub status: HumanReviewStatus,
    pub escalation_reason: String,
    pub goal_id: Option<String>,
    pub pipeline_id: Option<String>,
    pub feedback_decision: Option<String>,
    pub feedback_reviewer: Option<String>,
    pub resolved_at_ms: Option<u64>,
    pub metadata: Option<serde_json::Value>,
    pub escalation_context: Option<serde_json::Value>,
    pub feedback_notes: Option<String>,
    pub revision_instructions: Option<String>,
}

/// An append-only entry in `memory/learnings.md`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningEntry {
    pub recorded_at_ms: u64,
    pub skill: Option<String>,
    pub summary: String,
    pub body: String,
}

/// Spend record for a single executed task, passed to the (external) cost
/// tracker sink; `mf-core` only defines the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    pub task_id: String,
    pub skill: String,
    pub model: String,
    pub tokens_used: u64,
    pub estimated_cost_usd: f64,
    pub recorded_at_ms: u64,
}

#[cfg(test)]
#[path = "review_tests.rs"]
mod tests;
