// SPDX-License-Identifier: MIT

//! Typed human-review persistence: `reviews/human/{humanReviewId}.md`.

use crate::error::WorkspaceError;
use crate::frontmatter;
use crate::store::Workspace;
use mf_core::{HumanReviewId, HumanReviewItem, HumanReviewStatus, Urgency};
use std::str::FromStr;

impl FromStr for Urgency {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "critical" => Urgency::Critical,
            "high" => Urgency::High,
            "normal" => Urgency::Normal,
            _ => return Err(()),
        })
    }
}

fn urgency_str(u: Urgency) -> &'static str {
    match u {
        Urgency::Critical => "critical",
        Urgency::High => "high",
        Urgency::Normal => "normal",
    }
}

fn human_review_path(id: &HumanReviewId) -> String {
    format!("reviews/human/{id}.md")
}

fn render(item: &HumanReviewItem) -> String {
    let mut fields: Vec<(&str, String)> = vec![
        ("id", item.id.to_string()),
        ("task_id", item.task_id.clone()),
        ("skill", item.skill.clone()),
        ("created_at", item.created_at_ms.to_string()),
        ("urgency", urgency_str(item.urgency).to_string()),
        ("status", item.status.to_string()),
        ("escalation_reason", item.escalation_reason.clone()),
    ];
    if let Some(goal_id) = &item.goal_id {
        fields.push(("goal_id", goal_id.clone()));
    }
    if let Some(pipeline_id) = &item.pipeline_id {
        fields.push(("pipeline_id", pipeline_id.clone()));
    }
    if let Some(decision) = &item.feedback_decision {
        fields.push(("feedback_decision", decision.clone()));
    }
    if let Some(reviewer) = &item.feedback_reviewer {
        fields.push(("feedback_reviewer", reviewer.clone()));
    }
    if let Some(resolved_at) = item.resolved_at_ms {
        fields.push(("resolved_at", resolved_at.to_string()));
    }
    if let Some(metadata) = &item.metadata {
        fields.push(("metadata", metadata.to_string()));
    }

    let mut body = format!("# Human Review: {}\n\n## Escalation Details\n\n{}\n", item.id, item.escalation_reason);

    if let Some(context) = &item.escalation_context {
        body.push_str("\n## Escalation Context\n\n```json\n");
        body.push_str(&serde_json::to_string_pretty(context).unwrap_or_default());
        body.push_str("\n```\n");
    }

    if item.feedback_notes.is_some() || item.revision_instructions.is_some() {
        body.push_str("\n## Human Feedback\n\n");
        if let Some(notes) = &item.feedback_notes {
            body.push_str("### Notes\n\n");
            body.push_str(notes);
            body.push('\n');
        }
        if let Some(instructions) = &item.revision_instructions {
            body.push_str("\n### Revision Instructions\n\n");
            body.push_str(instructions);
            body.push('\n');
        }
    }

    frontmatter::render(fields, &body)
}

fn parse(path: &str, text: &str) -> Result<HumanReviewItem, WorkspaceError> {
    let doc = frontmatter::parse(path, text)?;
    let f = &doc.fields;
    let err = |field: &str| WorkspaceError::ParseError {
        path: path.to_string(),
        message: format!("missing required field `{field}`"),
    };
    let enum_err = |field: &str, value: &str| WorkspaceError::ParseError {
        path: path.to_string(),
        message: format!("invalid value for `{field}`: {value:?}"),
    };

    let id = f.get("id").ok_or_else(|| err("id"))?;
    let task_id = f.get("task_id").ok_or_else(|| err("task_id"))?.clone();
    let skill = f.get("skill").ok_or_else(|| err("skill"))?.clone();
    let created_at = f.get("created_at").ok_or_else(|| err("created_at"))?;
    let urgency_str = f.get("urgency").ok_or_else(|| err("urgency"))?;
    let status_str = f.get("status").ok_or_else(|| err("status"))?;
    let escalation_reason = f.get("escalation_reason").ok_or_else(|| err("escalation_reason"))?.clone();

    let urgency = Urgency::from_str(urgency_str).map_err(|_| enum_err("urgency", urgency_str))?;
    let status = match status_str.as_str() {
        "pending" => HumanReviewStatus::Pending,
        "in_review" => HumanReviewStatus::InReview,
        "resolved" => HumanReviewStatus::Resolved,
        "expired" => HumanReviewStatus::Expired,
        other => return Err(enum_err("status", other)),
    };

    let metadata = f.get("metadata").map(|s| serde_json::from_str(s)).transpose().map_err(|e| {
        WorkspaceError::ParseError { path: path.to_string(), message: e.to_string() }
    })?;

    let mut escalation_context = None;
    let mut feedback_notes = None;
    let mut revision_instructions = None;
    let mut section = "";
    let mut buf: Vec<&str> = Vec::new();
    let mut in_json_fence = false;

    let flush = |section: &str, buf: &mut Vec<&str>, notes: &mut Option<String>, instr: &mut Option<String>| {
        while buf.first().map(|l| l.is_empty()).unwrap_or(false) {
            buf.remove(0);
        }
        while buf.last().map(|l| l.is_empty()).unwrap_or(false) {
            buf.pop();
        }
        if buf.is_empty() {
            return;
        }
        let text = buf.join("\n");
        match section {
            "notes" => *notes = Some(text),
            "instructions" => *instr = Some(text),
            _ => {}
        }
        buf.clear();
    };

    for line in doc.body.lines() {
        if line.trim() == "```json" && section == "context" {
            in_json_fence = true;
            buf.clear();
            continue;
        }
        if line.trim() == "```" && in_json_fence {
            in_json_fence = false;
            let raw = buf.join("\n");
            escalation_context = serde_json::from_str(&raw).ok();
            buf.clear();
            continue;
        }
        if in_json_fence {
            buf.push(line);
            continue;
        }
        if let Some(rest) = line.strip_prefix("### ") {
            flush(section, &mut buf, &mut feedback_notes, &mut revision_instructions);
            section = match rest {
                "Notes" => "notes",
                "Revision Instructions" => "instructions",
                _ => "",
            };
            continue;
        }
        if let Some(rest) = line.strip_prefix("## ") {
            flush(section, &mut buf, &mut feedback_notes, &mut revision_instructions);
            section = match rest {
                "Escalation Details" => "details",
                "Escalation Context" => "context",
                "Human Feedback" => "feedback",
                _ => "",
            };
            continue;
        }
        if section == "notes" || section == "instructions" {
            buf.push(line);
        }
    }
    flush(section, &mut buf, &mut feedback_notes, &mut revision_instructions);

    Ok(HumanReviewItem {
        id: HumanReviewId::from_string(id),
        task_id,
        skill,
        created_at_ms: created_at
            .parse()
            .map_err(|_| enum_err("created_at", created_at))?,
        urgency,
        status,
        escalation_reason,
        goal_id: f.get("goal_id").cloned(),
        pipeline_id: f.get("pipeline_id").cloned(),
        feedback_decision: f.get("feedback_decision").cloned(),
        feedback_reviewer: f.get("feedback_reviewer").cloned(),
        resolved_at_ms: f.get("resolved_at").and_then(|s| s.parse().ok()),
        metadata,
        escalation_context,
        feedback_notes,
        revision_instructions,
    })
}

impl Workspace {
    pub async fn write_human_review(&self, item: &HumanReviewItem) -> Result<(), WorkspaceError> {
        self.write_file(&human_review_path(&item.id), &render(item)).await
    }

    pub async fn read_human_review(&self, id: &HumanReviewId) -> Result<HumanReviewItem, WorkspaceError> {
        let path = human_review_path(id);
        let text = self.read_file(&path).await?;
        parse(&path, &text)
    }

    pub async fn list_human_reviews(&self) -> Result<Vec<HumanReviewItem>, WorkspaceError> {
        let mut items = Vec::new();
        for relative in self.list_files("reviews/human", ".md").await? {
            let text = self.read_file(&relative).await?;
            items.push(parse(&relative, &text)?);
        }
        Ok(items)
    }

    /// Atomic read-validate-write update: applies `mutate` under
    /// the single lock acquisition that spans the read and the write.
    pub async fn update_human_review(
        &self,
        id: &HumanReviewId,
        mutate: impl FnOnce(&mut HumanReviewItem),
    ) -> Result<HumanReviewItem, WorkspaceError> {
        let relative = human_review_path(id);
        let target = self.resolve(&relative)?;
        let _guard = self.lock(&target).await?;

        let text = tokio::fs::read_to_string(&target).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WorkspaceError::NotFound(relative.clone())
            } else {
                WorkspaceError::ReadFailed { path: relative.clone(), source: e }
            }
        })?;
        let mut item = parse(&relative, &text)?;
        mutate(&mut item);
        let rendered = render(&item);
        tokio::fs::write(&target, rendered)
            .await
            .map_err(|e| WorkspaceError::WriteFailed { path: relative.clone(), source: e })?;
        Ok(item)
    }
}

#[cfg(test)]
#[path = "human_review_store_tests.rs"]
mod tests;
