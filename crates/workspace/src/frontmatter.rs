// SPDX-License-Identifier: MIT

//! Generic markdown-with-YAML-frontmatter parsing and rendering.
//!
//! Frontmatter is a sequence of `key: value` lines bounded by two lines that
//! are exactly `---` (trailing whitespace allowed). The split within a line
//! is at the FIRST colon; lines with no colon, or an empty key, are ignored.
//! A `---` that appears inside a fenced code block in the body is not a
//! delimiter — only the first two bare `---` lines at the top of the file
//! count, so a fenced block later in the body (e.g. the human-review
//! escalation-context JSON block) can't be mistaken for frontmatter.

use crate::error::WorkspaceError;
use std::collections::BTreeMap;

const DELIMITER: &str = "---";

/// A parsed document: the ordered key/value frontmatter pairs and the raw
/// markdown body that followed the closing delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub fields: BTreeMap<String, String>,
    pub body: String,
}

/// Parse `text` into frontmatter fields plus body. `path` is used only for
/// error messages.
pub fn parse(path: &str, text: &str) -> Result<Document, WorkspaceError> {
    let mut lines = text.lines();

    let Some(first) = lines.next() else {
        return Err(WorkspaceError::ParseError { path: path.to_string(), message: "empty file".into() });
    };
    if first.trim_end() != DELIMITER {
        return Err(WorkspaceError::ParseError {
            path: path.to_string(),
            message: "missing opening frontmatter delimiter".into(),
        });
    }

    let mut fields = BTreeMap::new();
    let mut closed = false;
    let mut body_lines: Vec<&str> = Vec::new();

    for line in lines.by_ref() {
        if line.trim_end() == DELIMITER {
            closed = true;
            break;
        }
        let Some(colon) = line.find(':') else { continue };
        let key = line[..colon].trim();
        if key.is_empty() {
            continue;
        }
        let value = line[colon + 1..].trim();
        fields.insert(key.to_string(), value.to_string());
    }

    if !closed {
        return Err(WorkspaceError::ParseError {
            path: path.to_string(),
            message: "missing closing frontmatter delimiter".into(),
        });
    }

    // The closing delimiter line is followed (if present) by a single blank
    // separator line before the body; drop at most one to avoid a leading
    // blank line creeping into every rendered body.
    let mut remaining: Vec<&str> = lines.collect();
    if remaining.first() == Some(&"") {
        remaining.remove(0);
    }
    body_lines.extend(remaining);

    Ok(Document { fields, body: body_lines.join("\n") })
}

/// Render `fields` (in the given order) and `body` back into frontmatter
/// form. Callers control field order by passing an ordered iterator.
pub fn render<'a>(fields: impl IntoIterator<Item = (&'a str, String)>, body: &str) -> String {
    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');
    for (key, value) in fields {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(&value);
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out.push('\n');
    out.push_str(body);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "frontmatter_tests.rs"]
mod tests;
