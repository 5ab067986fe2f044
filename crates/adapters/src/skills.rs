// SPDX-License-Identifier: MIT

//! Skill registry: skill prompt bodies and reference docs
//! are treated as input data, loaded from a `skills/`
//! directory that sits alongside — not inside — the Workspace root, since
//! it's operator-authored content rather than runtime-produced state.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SkillError {
    #[error("skill not found: {0}")]
    NotFound(String),
    #[error("failed reading skill {skill}: {message}")]
    ReadFailed { skill: String, message: String },
}

/// A loaded skill: its prompt body plus any reference documents.
#[derive(Debug, Clone)]
pub struct Skill {
    pub name: String,
    pub body: String,
    pub references: Vec<(String, String)>,
}

impl Skill {
    /// Build the system prompt: skill body, then each
    /// reference prefixed `## Reference: {path}`. Empty iff both the body
    /// and the reference list are empty.
    pub fn system_prompt(&self) -> String {
        let mut parts = Vec::new();
        if !self.body.trim().is_empty() {
            parts.push(self.body.clone());
        }
        for (path, content) in &self.references {
            parts.push(format!("## Reference: {path}\n\n{content}"));
        }
        parts.join("\n\n")
    }
}

/// Maps a skill name to the squad its output is routed under
/// 10). Unrecognised skills fall back to `"general"` rather than erroring —
/// the squad routing is a path-naming convenience, not a validation gate.
pub fn squad_for(skill: &str) -> &'static str {
    match skill {
        "content-strategy" | "copy-editing" => "strategy",
        "copywriting" | "email-sequence" | "social-content" => "creative",
        "paid-ads" | "page-cro" | "seo-audit" | "seo-content" => "convert",
        "analytics-review" | "competitor-watch" => "intel",
        _ => "general",
    }
}

pub struct SkillRegistry {
    root: PathBuf,
}

impl SkillRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load `skill`'s prompt body (`skills/{skill}.md`) plus every
    /// reference document under `skills/{skill}/refs/*.md`, sorted by file
    /// name. Missing skill file → [`SkillError::NotFound`].
    pub async fn load(&self, skill: &str) -> Result<Skill, SkillError> {
        let prompt_path = self.root.join(format!("{skill}.md"));
        let body = match tokio::fs::read_to_string(&prompt_path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SkillError::NotFound(skill.to_string()))
            }
            Err(e) => {
                return Err(SkillError::ReadFailed { skill: skill.to_string(), message: e.to_string() })
            }
        };

        let refs_dir = self.root.join(skill).join("refs");
        let references = read_references(&refs_dir)
            .await
            .map_err(|e| SkillError::ReadFailed { skill: skill.to_string(), message: e })?;

        Ok(Skill { name: skill.to_string(), body, references })
    }
}

async fn read_references(dir: &Path) -> Result<Vec<(String, String)>, String> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.to_string()),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| e.to_string())? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".md") {
            names.push(name);
        }
    }
    names.sort();

    let mut references = Vec::new();
    for name in names {
        let path = dir.join(&name);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| e.to_string())?;
        references.push((format!("{}/refs/{name}", path.parent().and_then(|p| p.file_name()).map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()), content));
    }
    Ok(references)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_body_and_sorted_references() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("copywriting.md"), "Write persuasive copy.").await.unwrap();
        tokio::fs::create_dir_all(dir.path().join("copywriting/refs")).await.unwrap();
        tokio::fs::write(dir.path().join("copywriting/refs/b.md"), "second").await.unwrap();
        tokio::fs::write(dir.path().join("copywriting/refs/a.md"), "first").await.unwrap();

        let registry = SkillRegistry::new(dir.path());
        let skill = registry.load("copywriting").await.unwrap();
        assert_eq!(skill.body, "Write persuasive copy.");
        assert_eq!(skill.references.len(), 2);
        assert!(skill.references[0].0.ends_with("a.md"));
        assert!(skill.references[1].0.ends_with("b.md"));
    }

    #[tokio::test]
    async fn missing_skill_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let registry = SkillRegistry::new(dir.path());
        let err = registry.load("nonexistent").await.unwrap_err();
        assert_eq!(err, SkillError::NotFound("nonexistent".into()));
    }

    #[tokio::test]
    async fn missing_refs_dir_yields_empty_references() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("seo-audit.md"), "Audit the site.").await.unwrap();
        let registry = SkillRegistry::new(dir.path());
        let skill = registry.load("seo-audit").await.unwrap();
        assert!(skill.references.is_empty());
    }

    #[test]
    fn system_prompt_is_empty_when_body_and_refs_are_empty() {
        let skill = Skill { name: "x".into(), body: "".into(), references: Vec::new() };
        assert_eq!(skill.system_prompt(), "");
    }
}
