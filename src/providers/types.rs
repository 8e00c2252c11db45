//! Backend-agnostic bundle model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single file inside a remote bundle, keyed by its storage key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetFile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default)]
    pub raw_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub login: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    #[serde(default)]
    pub version: String,
}

/// A remote skill bundle, normalized across backends.
///
/// The field names follow the GitHub gist payload; other backends convert
/// their own shape into this one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetBundle {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub files: BTreeMap<String, SnippetFile>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub owner: Owner,
    /// Newest revision first.
    #[serde(default)]
    pub history: Vec<Revision>,
}

impl SnippetBundle {
    /// Handle of the bundle owner.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner.login
    }

    /// Content revision marker taken from the newest history entry.
    #[must_use]
    pub fn revision(&self) -> &str {
        self.history.first().map_or("", |rev| rev.version.as_str())
    }

    /// Storage key → content map, as handed to a backend's create call.
    #[must_use]
    pub fn contents(&self) -> BTreeMap<String, String> {
        self.files
            .iter()
            .map(|(key, file)| (key.clone(), file.content.clone()))
            .collect()
    }
}

/// Gists report anonymous owners and empty descriptions as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Whether a newly created bundle is publicly listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    Public,
    #[default]
    Secret,
}

impl Visibility {
    #[must_use]
    pub const fn from_public_flag(public: bool) -> Self {
        if public { Self::Public } else { Self::Secret }
    }

    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Secret => "secret",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_gist_payload() {
        let json = r##"{
            "id": "abc123",
            "description": "[gh-skill] Weather lookups",
            "files": {
                "weather.skill.md": {
                    "filename": "weather.skill.md",
                    "content": "---\nname: weather\n---\n",
                    "raw_url": "https://gist.githubusercontent.com/nico/abc123/raw/weather.skill.md"
                }
            },
            "html_url": "https://gist.github.com/nico/abc123",
            "created_at": "2025-01-02T03:04:05Z",
            "updated_at": "2025-01-03T03:04:05Z",
            "owner": {"login": "nico", "id": 7},
            "history": [{"version": "f00d"}, {"version": "beef"}]
        }"##;

        let bundle: SnippetBundle = serde_json::from_str(json).unwrap();
        assert_eq!(bundle.id, "abc123");
        assert_eq!(bundle.owner(), "nico");
        assert_eq!(bundle.revision(), "f00d");
        assert_eq!(bundle.files.len(), 1);
        assert!(bundle.files["weather.skill.md"].raw_url.ends_with("weather.skill.md"));
    }

    #[test]
    fn null_owner_and_missing_history() {
        let json = r#"{"id": "anon", "owner": null, "files": {}}"#;
        let bundle: SnippetBundle = serde_json::from_str(json).unwrap();
        assert_eq!(bundle.owner(), "");
        assert_eq!(bundle.revision(), "");
    }

    #[test]
    fn visibility_flag() {
        assert_eq!(Visibility::from_public_flag(true), Visibility::Public);
        assert_eq!(Visibility::default(), Visibility::Secret);
        assert!(!Visibility::Secret.is_public());
    }
}
