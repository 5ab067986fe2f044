// SPDX-License-Identifier: MIT

//! Typed task persistence: `tasks/{id}.md`.

use crate::error::WorkspaceError;
use crate::frontmatter;
use crate::store::Workspace;
use mf_core::{InputRef, OutputSpec, Task, TaskId, TaskNext, TaskOrigin, TaskStatus};
use std::collections::HashMap;
use std::str::FromStr;

fn task_path(id: &TaskId) -> String {
    format!("tasks/{id}.md")
}

/// Criteria for [`Workspace::list_tasks`]. All fields are ANDed; `None`
/// means "don't filter on this field".
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub to_skill: Option<String>,
    pub goal_id: Option<String>,
    pub pipeline_id: Option<String>,
}

impl TaskFilter {
    fn matches(&self, task: &Task) -> bool {
        self.status.map(|s| s == task.status).unwrap_or(true)
            && self.to_skill.as_deref().map(|s| s == task.to).unwrap_or(true)
            && self.goal_id.as_deref().map(|g| Some(g) == task.goal_id.as_deref()).unwrap_or(true)
            && self
                .pipeline_id
                .as_deref()
                .map(|p| Some(p) == task.pipeline_id.as_deref())
                .unwrap_or(true)
    }
}

fn render_task(task: &Task) -> String {
    let mut fields: Vec<(&str, String)> = vec![
        ("id", task.id.to_string()),
        ("status", task.status.to_string()),
        ("priority", task.priority.to_string()),
        ("from", task.from.to_string()),
        ("to", task.to.clone()),
        ("created_at", task.created_at_ms.to_string()),
        ("updated_at", task.updated_at_ms.to_string()),
        ("revision_count", task.revision_count.to_string()),
        ("output_path", task.output.path.clone()),
        ("output_format", task.output.format.clone()),
    ];

    match &task.next {
        TaskNext::DirectorReview => fields.push(("next_type", "director_review".to_string())),
        TaskNext::Agent { skill } => {
            fields.push(("next_type", "agent".to_string()));
            fields.push(("next_skill", skill.clone()));
        }
        TaskNext::PipelineContinue { pipeline_id } => {
            fields.push(("next_type", "pipeline_continue".to_string()));
            fields.push(("next_pipeline", pipeline_id.clone()));
        }
        TaskNext::Complete => fields.push(("next_type", "complete".to_string())),
    }

    if let Some(deadline) = task.deadline_ms {
        fields.push(("deadline", deadline.to_string()));
    }
    if let Some(goal_id) = &task.goal_id {
        fields.push(("goal_id", goal_id.clone()));
    }
    if let Some(pipeline_id) = &task.pipeline_id {
        fields.push(("pipeline_id", pipeline_id.clone()));
    }
    if !task.tags.is_empty() {
        fields.push(("tags", task.tags.join(",")));
    }
    if !task.metadata.is_empty() {
        fields.push(("metadata", serde_json::to_string(&task.metadata).unwrap_or_default()));
    }

    let mut body = String::new();
    body.push_str(&format!("# Task: {}\n\n", task.id));
    body.push_str("## Assignment\n\n");
    body.push_str(&format!("- **From:** {}\n", task.from));
    body.push_str(&format!("- **To:** {}\n", task.to));
    body.push_str(&format!("- **Priority:** {}\n\n", task.priority));
    body.push_str("## Context\n\n");
    body.push_str(&format!("- **Goal:** {}\n", task.goal));
    for input in &task.inputs {
        body.push_str(&format!("- `{}` — {}\n", input.path, input.description));
    }
    body.push('\n');
    body.push_str("## Requirements\n\n");
    body.push_str(&task.requirements);
    body.push_str("\n\n");
    body.push_str("## Output\n\n");
    body.push_str(&format!("- Write to: `{}`\n", task.output.path));
    body.push_str(&format!("- Format: {}\n", task.output.format));
    body.push_str(&format!("- Then: {}\n", task.next));

    frontmatter::render(fields, &body)
}

fn parse_task(path: &str, text: &str) -> Result<Task, WorkspaceError> {
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

    let id_str = f.get("id").ok_or_else(|| err("id"))?;
    let status_str = f.get("status").ok_or_else(|| err("status"))?;
    let priority_str = f.get("priority").ok_or_else(|| err("priority"))?;
    let from_str = f.get("from").ok_or_else(|| err("from"))?;
    let to = f.get("to").ok_or_else(|| err("to"))?.clone();
    let created_at = f.get("created_at").ok_or_else(|| err("created_at"))?;
    let updated_at = f.get("updated_at").ok_or_else(|| err("updated_at"))?;
    let revision_count = f.get("revision_count").ok_or_else(|| err("revision_count"))?;
    let output_path = f.get("output_path").ok_or_else(|| err("output_path"))?.clone();
    let output_format = f.get("output_format").ok_or_else(|| err("output_format"))?.clone();
    let next_type = f.get("next_type").ok_or_else(|| err("next_type"))?;

    let status = TaskStatus::from_str(status_str).map_err(|_| enum_err("status", status_str))?;
    let priority =
        mf_core::Priority::from_str(priority_str).map_err(|_| enum_err("priority", priority_str))?;

    let next = match next_type.as_str() {
        "director_review" => TaskNext::DirectorReview,
        "agent" => TaskNext::Agent {
            skill: f.get("next_skill").ok_or_else(|| err("next_skill"))?.clone(),
        },
        "pipeline_continue" => TaskNext::PipelineContinue {
            pipeline_id: f.get("next_pipeline").ok_or_else(|| err("next_pipeline"))?.clone(),
        },
        "complete" => TaskNext::Complete,
        other => return Err(enum_err("next_type", other)),
    };

    let tags = f
        .get("tags")
        .map(|s| s.split(',').filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default();
    let metadata: HashMap<String, serde_json::Value> = f
        .get("metadata")
        .map(|s| serde_json::from_str(s))
        .transpose()
        .map_err(|e| WorkspaceError::ParseError { path: path.to_string(), message: e.to_string() })?
        .unwrap_or_default();

    // Upstream inputs and the free-text goal/requirements are carried only
    // in the body's `## Context` / `## Requirements` sections; reconstruct
    // them from the rendered markdown rather than duplicating in frontmatter.
    let (goal, inputs, requirements) = parse_body_sections(&doc.body);

    Ok(Task {
        id: TaskId::from_string(id_str),
        from: TaskOrigin::parse(from_str),
        to,
        priority,
        deadline_ms: f.get("deadline").and_then(|s| s.parse().ok()),
        status,
        revision_count: revision_count
            .parse()
            .map_err(|_| enum_err("revision_count", revision_count))?,
        goal_id: f.get("goal_id").cloned(),
        pipeline_id: f.get("pipeline_id").cloned(),
        goal,
        inputs,
        requirements,
        output: OutputSpec { path: output_path, format: output_format },
        next,
        tags,
        metadata,
        created_at_ms: created_at.parse().map_err(|_| enum_err("created_at", created_at))?,
        updated_at_ms: updated_at.parse().map_err(|_| enum_err("updated_at", updated_at))?,
    })
}

fn parse_body_sections(body: &str) -> (String, Vec<InputRef>, String) {
    let mut goal = String::new();
    let mut inputs = Vec::new();
    let mut requirements_lines = Vec::new();
    let mut section = "";

    for line in body.lines() {
        if let Some(rest) = line.strip_prefix("## ") {
            section = match rest {
                "Context" => "context",
                "Requirements" => "requirements",
                _ => "",
            };
            continue;
        }
        match section {
            "context" => {
                if let Some(rest) = line.strip_prefix("- **Goal:** ") {
                    goal = rest.to_string();
                } else if let Some(rest) = line.strip_prefix("- `") {
                    if let Some((path, description)) = rest.split_once("` — ") {
                        inputs.push(InputRef { path: path.to_string(), description: description.to_string() });
                    }
                }
            }
            "requirements" => requirements_lines.push(line),
            _ => {}
        }
    }

    // Trim the blank separator lines the renderer inserts around sections.
    while requirements_lines.first().map(|l| l.is_empty()).unwrap_or(false) {
        requirements_lines.remove(0);
    }
    while requirements_lines.last().map(|l| l.is_empty()).unwrap_or(false) {
        requirements_lines.pop();
    }
    (goal, inputs, requirements_lines.join("\n"))
}

impl Workspace {
    pub async fn write_task(&self, task: &Task) -> Result<(), WorkspaceError> {
        self.write_file(&task_path(&task.id), &render_task(task)).await
    }

    pub async fn read_task(&self, id: &TaskId) -> Result<Task, WorkspaceError> {
        let path = task_path(id);
        let text = self.read_file(&path).await?;
        parse_task(&path, &text)
    }

    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, WorkspaceError> {
        let mut tasks = Vec::new();
        for relative in self.list_files("tasks", ".md").await? {
            let text = self.read_file(&relative).await?;
            let task = parse_task(&relative, &text)?;
            if filter.matches(&task) {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    /// Atomic read-validate-write status transition:
    /// the whole read/validate/mutate/write span runs under a single lock
    /// acquisition on the task's file path.
    pub async fn update_task_status(
        &self,
        id: &TaskId,
        to: TaskStatus,
        now_ms: u64,
    ) -> Result<Task, WorkspaceError> {
        let relative = task_path(id);
        let target = self.resolve(&relative)?;
        let _guard = self.lock(&target).await?;

        let text = tokio::fs::read_to_string(&target).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WorkspaceError::NotFound(relative.clone())
            } else {
                WorkspaceError::ReadFailed { path: relative.clone(), source: e }
            }
        })?;
        let mut task = parse_task(&relative, &text)?;
        task.set_status(to, now_ms)?;
        let rendered = render_task(&task);
        tokio::fs::write(&target, rendered)
            .await
            .map_err(|e| WorkspaceError::WriteFailed { path: relative.clone(), source: e })?;
        Ok(task)
    }
}

#[cfg(test)]
#[path = "task_store_tests.rs"]
mod tests;
