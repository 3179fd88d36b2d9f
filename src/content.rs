//! Panel content and its serialization into a script string literal.
//!
//! The serialized form is embedded between double quotes inside the generated
//! document's script, so newlines become `\n` and double quotes become `\"`.
//! Backslashes are passed through untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator placed between lines when content is given as a sequence.
const LINE_SEPARATOR: &str = "\n\n";

/// Markdown shown by a panel: a single text or an ordered list of lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Lines(Vec<String>),
}

impl Default for Content {
    fn default() -> Self {
        Content::Text(String::new())
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<Vec<String>> for Content {
    fn from(lines: Vec<String>) -> Self {
        Content::Lines(lines)
    }
}

impl From<Vec<&str>> for Content {
    fn from(lines: Vec<&str>) -> Self {
        Content::Lines(lines.into_iter().map(str::to_string).collect())
    }
}

/// Content escaped for use inside a double-quoted script string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SerializedContent(String);

impl SerializedContent {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SerializedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize content into one escaped string.
pub fn serialize_content(content: &Content) -> SerializedContent {
    let text = match content {
        Content::Text(text) => text.clone(),
        Content::Lines(lines) => lines
            .join(LINE_SEPARATOR)
            .trim_end_matches('\n')
            .to_string(),
    };
    SerializedContent(escape_script_string(&text))
}

fn escape_script_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
