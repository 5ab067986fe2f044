// SPDX-License-Identifier: MIT

//! Typed artifact persistence: `outputs/{squad}/{skill}/{taskId}.md`.
//!
//! Artifacts are the agent's raw markdown response, stored verbatim —
//! no frontmatter codec, since the file *is* the deliverable a downstream
//! step reads as an input, not an entity with typed fields.

use crate::error::WorkspaceError;
use crate::store::Workspace;

pub fn output_path(squad: &str, skill: &str, task_id: &str) -> String {
    format!("outputs/{squad}/{skill}/{task_id}.md")
}

impl Workspace {
    pub async fn write_output(
        &self,
        squad: &str,
        skill: &str,
        task_id: &str,
        content: &str,
    ) -> Result<String, WorkspaceError> {
        let path = output_path(squad, skill, task_id);
        self.write_file(&path, content).await?;
        Ok(path)
    }

    pub async fn read_output(&self, relative_path: &str) -> Result<String, WorkspaceError> {
        self.read_file(relative_path).await
    }
}

#[cfg(test)]
#[path = "output_store_tests.rs"]
mod tests;
