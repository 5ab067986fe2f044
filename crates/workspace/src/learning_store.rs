// SPDX-License-Identifier: MIT

//! Append-only learnings ledger: `memory/learnings.md`.
//!
//! `append_learning` is an atomic read-modify-write under the file's lock;
//! on first call it prepends a '# Learnings' header. Entries are separated
//! by a `---` rule on its own line, which is safe here because
//! `learnings.md` is not parsed through the frontmatter codec — it's a flat
//! append log, not an entity file with a frontmatter/body split.

use crate::error::WorkspaceError;
use crate::store::Workspace;
use mf_core::LearningEntry;

const PATH: &str = "memory/learnings.md";
const HEADER: &str = "# Learnings\n\n";
const SEPARATOR: &str = "\n---\n\n";

fn render_entry(entry: &LearningEntry) -> String {
    let skill = entry.skill.as_deref().unwrap_or("general");
    let mut out = format!("## {} — {}\n\n", entry.recorded_at_ms, skill);
    out.push_str(&entry.summary);
    if !entry.body.is_empty() {
        out.push_str("\n\n");
        out.push_str(&entry.body);
    }
    out
}

fn parse_entry(block: &str) -> Option<LearningEntry> {
    let mut lines = block.lines();
    let heading = lines.next()?;
    let rest = heading.strip_prefix("## ")?;
    let (recorded_at_str, skill_str) = rest.split_once(" — ")?;
    let recorded_at_ms = recorded_at_str.trim().parse().ok()?;
    let skill = if skill_str.trim() == "general" { None } else { Some(skill_str.trim().to_string()) };

    let rest_text = lines.collect::<Vec<_>>().join("\n");
    let rest_text = rest_text.trim_start_matches('\n');
    let (summary, body) = match rest_text.split_once("\n\n") {
        Some((s, b)) => (s.to_string(), b.to_string()),
        None => (rest_text.to_string(), String::new()),
    };

    Some(LearningEntry { recorded_at_ms, skill, summary, body })
}

/// Split `text` (with the header already stripped) into raw entry blocks.
fn split_entries(text: &str) -> Vec<String> {
    text.split(SEPARATOR).map(str::trim).filter(|b| !b.is_empty()).map(str::to_string).collect()
}

fn render_file(entries: &[String]) -> String {
    let mut out = HEADER.to_string();
    out.push_str(&entries.join(SEPARATOR));
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

impl Workspace {
    /// Append `entry` under the `# Learnings` header, creating the header on
    /// the first call. The whole read-modify-write span holds one lock
    /// acquisition on `memory/learnings.md`.
    pub async fn append_learning(&self, entry: &LearningEntry) -> Result<(), WorkspaceError> {
        let target = self.resolve(PATH)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| WorkspaceError::WriteFailed { path: parent.display().to_string(), source: e })?;
        }
        let _guard = self.lock(&target).await?;

        let existing = match tokio::fs::read_to_string(&target).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(WorkspaceError::ReadFailed { path: PATH.to_string(), source: e }),
        };

        let body = existing.strip_prefix(HEADER).unwrap_or(&existing);
        let mut entries = split_entries(body);
        entries.push(render_entry(entry));

        tokio::fs::write(&target, render_file(&entries))
            .await
            .map_err(|e| WorkspaceError::WriteFailed { path: PATH.to_string(), source: e })
    }

    /// All learnings in append order (oldest first).
    pub async fn read_learnings(&self) -> Result<Vec<LearningEntry>, WorkspaceError> {
        let text = match self.read_file(PATH).await {
            Ok(t) => t,
            Err(WorkspaceError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let body = text.strip_prefix(HEADER).unwrap_or(&text);
        Ok(split_entries(body).iter().filter_map(|b| parse_entry(b)).collect())
    }
}

#[cfg(test)]
#[path = "learning_store_tests.rs"]
mod tests;
