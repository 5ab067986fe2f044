// SPDX-License-Identifier: MIT

//! Typed review persistence: `reviews/{taskId}-review[-{n}].md`.

use crate::error::WorkspaceError;
use crate::frontmatter;
use crate::store::Workspace;
use mf_core::{Finding, Review, ReviewId, RevisionPriority, RevisionRequest, Severity, Verdict};
use std::str::FromStr;

impl FromStr for Severity {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "critical" => Severity::Critical,
            "major" => Severity::Major,
            "minor" => Severity::Minor,
            "suggestion" => Severity::Suggestion,
            _ => return Err(()),
        })
    }
}

impl FromStr for RevisionPriority {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "required" => RevisionPriority::Required,
            "recommended" => RevisionPriority::Recommended,
            "optional" => RevisionPriority::Optional,
            _ => return Err(()),
        })
    }
}

fn review_base(task_id: &str) -> String {
    format!("{task_id}-review")
}

/// Parse the `-{n}` suffix off a review filename stem, if present. A bare
/// `{task_id}-review` is index 1.
fn parse_index(stem: &str, base: &str) -> Option<u32> {
    let rest = stem.strip_prefix(base)?;
    if rest.is_empty() {
        Some(1)
    } else {
        rest.strip_prefix('-')?.parse().ok()
    }
}

fn render_review(review: &Review) -> String {
    let fields = vec![
        ("id", review.id.to_string()),
        ("task_id", review.task_id.clone()),
        ("created_at", review.created_at_ms.to_string()),
        ("reviewer", review.reviewer.clone()),
        ("author", review.author.clone()),
        ("verdict", review.verdict.to_string()),
    ];

    let mut body = String::new();
    body.push_str("## Summary\n\n");
    body.push_str(&review.summary);
    body.push('\n');

    if !review.findings.is_empty() {
        body.push_str("\n## Findings\n\n");
        for finding in &review.findings {
            body.push_str(&format!(
                "- **[{}]** {}: {}\n",
                finding.severity, finding.section, finding.description
            ));
        }
    }

    if !review.revision_requests.is_empty() {
        body.push_str("\n## Revision Requests\n\n");
        for request in &review.revision_requests {
            body.push_str(&format!("- **[{}]** {}\n", request.priority, request.description));
        }
    }

    frontmatter::render(fields, &body)
}

fn parse_review(path: &str, text: &str) -> Result<Review, WorkspaceError> {
    let doc = frontmatter::parse(path, text)?;
    let f = &doc.fields;
    let err = |field: &str| WorkspaceError::ParseError {
        path: path.to_string(),
        message: format!("missing required field `{field}`"),
    };

    let id = f.get("id").ok_or_else(|| err("id"))?;
    let task_id = f.get("task_id").ok_or_else(|| err("task_id"))?.clone();
    let created_at = f.get("created_at").ok_or_else(|| err("created_at"))?;
    let reviewer = f.get("reviewer").ok_or_else(|| err("reviewer"))?.clone();
    let author = f.get("author").ok_or_else(|| err("author"))?.clone();
    let verdict_str = f.get("verdict").ok_or_else(|| err("verdict"))?;

    let verdict = match verdict_str.as_str() {
        "APPROVE" => Verdict::Approve,
        "REVISE" => Verdict::Revise,
        "REJECT" => Verdict::Reject,
        other => {
            return Err(WorkspaceError::ParseError {
                path: path.to_string(),
                message: format!("invalid verdict: {other:?}"),
            })
        }
    };

    let mut summary_lines = Vec::new();
    let mut findings = Vec::new();
    let mut revision_requests = Vec::new();
    let mut section = "";

    for line in doc.body.lines() {
        if let Some(rest) = line.strip_prefix("## ") {
            section = match rest {
                "Summary" => "summary",
                "Findings" => "findings",
                "Revision Requests" => "revisions",
                _ => "",
            };
            continue;
        }
        match section {
            "summary" => summary_lines.push(line),
            "findings" => {
                if let Some((severity, rest)) = parse_bracketed(line) {
                    if let Some((section_name, description)) = rest.split_once(": ") {
                        if let Ok(severity) = Severity::from_str(&severity) {
                            findings.push(Finding {
                                severity,
                                section: section_name.to_string(),
                                description: description.to_string(),
                            });
                        }
                    }
                }
            }
            "revisions" => {
                if let Some((priority, description)) = parse_bracketed(line) {
                    if let Ok(priority) = RevisionPriority::from_str(&priority) {
                        revision_requests.push(RevisionRequest { priority, description });
                    }
                }
            }
            _ => {}
        }
    }
    while summary_lines.first().map(|l| l.is_empty()).unwrap_or(false) {
        summary_lines.remove(0);
    }
    while summary_lines.last().map(|l| l.is_empty()).unwrap_or(false) {
        summary_lines.pop();
    }

    Ok(Review {
        id: ReviewId::from_string(id),
        task_id,
        created_at_ms: created_at
            .parse()
            .map_err(|_| WorkspaceError::ParseError { path: path.to_string(), message: "bad created_at".into() })?,
        reviewer,
        author,
        verdict,
        summary: summary_lines.join("\n"),
        findings,
        revision_requests,
    })
}

/// Parse a `- **[{tag}]** {rest}` line into `(tag, rest)`.
fn parse_bracketed(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("- **[")?;
    let (tag, rest) = rest.split_once("]** ")?;
    Some((tag.to_string(), rest.to_string()))
}

impl Workspace {
    /// Write a review for `review.task_id`, auto-assigning the next
    /// available suffix. Returns the relative path written.
    pub async fn write_review(&self, review: &Review) -> Result<String, WorkspaceError> {
        let base = review_base(&review.task_id);
        let existing = self.list_files("reviews", ".md").await?;
        let next_index = existing
            .iter()
            .filter_map(|p| {
                let stem = p.strip_prefix("reviews/")?.strip_suffix(".md")?;
                parse_index(stem, &base)
            })
            .max()
            .map(|n| n + 1)
            .unwrap_or(1);

        let relative = if next_index == 1 {
            format!("reviews/{base}.md")
        } else {
            format!("reviews/{base}-{next_index}.md")
        };
        self.write_file(&relative, &render_review(review)).await?;
        Ok(relative)
    }

    pub async fn read_review(&self, relative: &str) -> Result<Review, WorkspaceError> {
        let text = self.read_file(relative).await?;
        parse_review(relative, &text)
    }

    /// All reviews for `task_id`, ordered oldest (no suffix) to newest.
    pub async fn list_reviews(&self, task_id: &str) -> Result<Vec<Review>, WorkspaceError> {
        let base = review_base(task_id);
        let mut indexed = Vec::new();
        for relative in self.list_files("reviews", ".md").await? {
            let Some(stem) = relative.strip_prefix("reviews/").and_then(|s| s.strip_suffix(".md")) else {
                continue;
            };
            let Some(index) = parse_index(stem, &base) else { continue };
            let text = self.read_file(&relative).await?;
            indexed.push((index, parse_review(&relative, &text)?));
        }
        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, review)| review).collect())
    }
}

#[cfg(test)]
#[path = "review_store_tests.rs"]
mod tests;
