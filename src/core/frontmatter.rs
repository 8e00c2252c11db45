//! YAML front matter in skill documents.
//!
//! A skill document may open with a block delimited by `---` lines:
//!
//! ```text
//! ---
//! name: weather
//! version: 1.0.0
//! tags: [api, weather]
//! ---
//! # Weather
//! ```
//!
//! A document without an opening delimiter simply has no front matter. An
//! opening delimiter without a closing one is a parse error.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::error::{Result, SkillError};

pub const DELIMITER: &str = "---";

/// Metadata declared in a skill document's front matter.
///
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "scalar")]
    pub name: String,
    #[serde(deserialize_with = "scalar")]
    pub description: String,
    #[serde(deserialize_with = "scalar")]
    pub version: String,
    #[serde(deserialize_with = "scalar_list")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "scalar_list")]
    pub tools: Vec<String>,
    #[serde(deserialize_with = "scalar")]
    pub author: String,
}

impl FrontMatter {
    /// Parse the front matter of `content`.
    ///
    /// Returns an empty record when the document has no front matter.
    pub fn parse(content: &str) -> Result<Self> {
        match locate(content) {
            Block::Absent => Ok(Self::default()),
            Block::Unterminated => Err(SkillError::Parse(format!(
                "front matter opened with {DELIMITER} but never closed"
            ))),
            Block::Closed { yaml, .. } => parse_yaml(yaml),
        }
    }
}

/// The document with any front matter block removed.
///
/// Documents whose block is never closed are returned whole.
#[must_use]
pub fn body(content: &str) -> &str {
    match locate(content) {
        Block::Closed { body_start, .. } => &content[body_start..],
        Block::Absent | Block::Unterminated => content,
    }
}

enum Block<'a> {
    Absent,
    Unterminated,
    Closed { yaml: &'a str, body_start: usize },
}

fn locate(content: &str) -> Block<'_> {
    let mut offset = 0;
    let mut lines = content.split_inclusive('\n');

    let opened = loop {
        let Some(line) = lines.next() else {
            break false;
        };
        offset += line.len();
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            break trimmed == DELIMITER;
        }
    };
    if !opened {
        return Block::Absent;
    }

    let yaml_start = offset;
    for line in lines {
        if line.trim() == DELIMITER {
            return Block::Closed {
                yaml: &content[yaml_start..offset],
                body_start: offset + line.len(),
            };
        }
        offset += line.len();
    }
    Block::Unterminated
}

fn parse_yaml(yaml: &str) -> Result<FrontMatter> {
    let value: Value = serde_yaml::from_str(yaml)
        .map_err(|err| SkillError::Parse(format!("front matter: {err}")))?;
    match value {
        Value::Null => Ok(FrontMatter::default()),
        Value::Mapping(_) => serde_yaml::from_value(value)
            .map_err(|err| SkillError::Parse(format!("front matter: {err}"))),
        _ => Err(SkillError::Parse(
            "front matter must be a key/value mapping".to_string(),
        )),
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// `version: 1.0` is a YAML number; keep it as text instead of failing.
fn scalar<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_to_string(Value::deserialize(deserializer)?)
        .ok_or_else(|| D::Error::custom("expected a scalar value"))
}

fn scalar_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| {
                scalar_to_string(item).ok_or_else(|| D::Error::custom("expected a list of scalars"))
            })
            .collect(),
        _ => Err(D::Error::custom("expected a list")),
    }
}
