// SPDX-License-Identifier: MIT

//! Typed goal persistence: `goals/{goalId}.md` and `goals/{goalId}-plan.md`.

use crate::error::WorkspaceError;
use crate::frontmatter;
use crate::store::Workspace;
use mf_core::{Goal, GoalId, GoalPhase, GoalPlan, Priority};
use std::str::FromStr;

fn goal_path(id: &GoalId) -> String {
    format!("goals/{id}.md")
}

fn plan_path(goal_id: &GoalId) -> String {
    format!("goals/{goal_id}-plan.md")
}

fn render_goal(goal: &Goal) -> String {
    let fields = vec![
        ("id", goal.id.to_string()),
        ("category", goal.category.clone()),
        ("priority", goal.priority.to_string()),
        ("created_at", goal.created_at_ms.to_string()),
    ];
    let body = format!("# Goal: {}\n\n## Description\n\n{}\n", goal.id, goal.description);
    frontmatter::render(fields, &body)
}

fn parse_goal(path: &str, text: &str) -> Result<Goal, WorkspaceError> {
    let doc = frontmatter::parse(path, text)?;
    let f = &doc.fields;
    let err = |field: &str| WorkspaceError::ParseError {
        path: path.to_string(),
        message: format!("missing required field `{field}`"),
    };
    let id = f.get("id").ok_or_else(|| err("id"))?;
    let category = f.get("category").ok_or_else(|| err("category"))?.clone();
    let priority_str = f.get("priority").ok_or_else(|| err("priority"))?;
    let created_at = f.get("created_at").ok_or_else(|| err("created_at"))?;

    let priority = Priority::from_str(priority_str).map_err(|_| WorkspaceError::ParseError {
        path: path.to_string(),
        message: format!("invalid priority: {priority_str:?}"),
    })?;

    let mut description = String::new();
    let mut in_description = false;
    for line in doc.body.lines() {
        if let Some(rest) = line.strip_prefix("## ") {
            in_description = rest == "Description";
            continue;
        }
        if in_description {
            if !description.is_empty() {
                description.push('\n');
            }
            description.push_str(line);
        }
    }
    while description.ends_with('\n') {
        description.pop();
    }

    Ok(Goal {
        id: GoalId::from_string(id),
        description: description.trim().to_string(),
        category,
        priority,
        created_at_ms: created_at
            .parse()
            .map_err(|_| WorkspaceError::ParseError { path: path.to_string(), message: "bad created_at".into() })?,
    })
}

fn render_plan(plan: &GoalPlan) -> String {
    let fields = vec![
        ("goal_id", plan.goal_id.to_string()),
        ("phase_count", plan.phases.len().to_string()),
    ];
    let mut body = format!("# Plan: {}\n\n", plan.goal_id);
    for (i, phase) in plan.phases.iter().enumerate() {
        body.push_str(&format!("## Phase {}\n\n", i + 1));
        body.push_str(&format!("- parallel: {}\n", phase.parallel));
        match phase.depends_on_phase {
            Some(d) => body.push_str(&format!("- depends_on: {}\n", d + 1)),
            None => body.push_str("- depends_on: none\n"),
        }
        body.push_str(&format!("- skills: {}\n\n", phase.skills.join(", ")));
    }
    frontmatter::render(fields, &body)
}

fn parse_plan(path: &str, text: &str) -> Result<GoalPlan, WorkspaceError> {
    let doc = frontmatter::parse(path, text)?;
    let f = &doc.fields;
    let goal_id = f
        .get("goal_id")
        .ok_or_else(|| WorkspaceError::ParseError {
            path: path.to_string(),
            message: "missing required field `goal_id`".into(),
        })?
        .clone();

    let mut phases = Vec::new();
    let mut parallel = false;
    let mut depends_on_phase = None;
    let mut skills: Vec<String> = Vec::new();
    let mut in_phase = false;

    let flush = |phases: &mut Vec<GoalPhase>, parallel: bool, depends_on_phase: Option<usize>, skills: &[String]| {
        if !skills.is_empty() {
            phases.push(GoalPhase { skills: skills.to_vec(), parallel, depends_on_phase });
        }
    };

    for line in doc.body.lines() {
        if let Some(rest) = line.strip_prefix("## Phase ") {
            if in_phase {
                flush(&mut phases, parallel, depends_on_phase, &skills);
            }
            in_phase = true;
            parallel = false;
            depends_on_phase = None;
            skills = Vec::new();
            let _ = rest;
            continue;
        }
        if !in_phase {
            continue;
        }
        if let Some(rest) = line.strip_prefix("- parallel: ") {
            parallel = rest.trim() == "true";
        } else if let Some(rest) = line.strip_prefix("- depends_on: ") {
            let rest = rest.trim();
            depends_on_phase = if rest == "none" {
                None
            } else {
                rest.parse::<usize>().ok().map(|n| n.saturating_sub(1))
            };
        } else if let Some(rest) = line.strip_prefix("- skills: ") {
            skills = rest.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
    }
    if in_phase {
        flush(&mut phases, parallel, depends_on_phase, &skills);
    }

    Ok(GoalPlan { goal_id: GoalId::from_string(goal_id), phases })
}

impl Workspace {
    pub async fn write_goal(&self, goal: &Goal) -> Result<(), WorkspaceError> {
        self.write_file(&goal_path(&goal.id), &render_goal(goal)).await
    }

    pub async fn read_goal(&self, id: &GoalId) -> Result<Goal, WorkspaceError> {
        let path = goal_path(id);
        let text = self.read_file(&path).await?;
        parse_goal(&path, &text)
    }

    pub async fn write_goal_plan(&self, plan: &GoalPlan) -> Result<(), WorkspaceError> {
        self.write_file(&plan_path(&plan.goal_id), &render_plan(plan)).await
    }

    pub async fn read_goal_plan(&self, goal_id: &GoalId) -> Result<GoalPlan, WorkspaceError> {
        let path = plan_path(goal_id);
        let text = self.read_file(&path).await?;
        parse_plan(&path, &text)
    }
}

#[cfg(test)]
#[path = "goal_store_tests.rs"]
mod tests;
