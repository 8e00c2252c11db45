//! GitLab Snippets backend, driven through the `glab` CLI.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::command::CliRunner;
use super::{Backend, Owner, Provider, Revision, SnippetBundle, SnippetFile, Visibility, matches_search};
use crate::config::ProvidersConfig;
use crate::error::{Result, SkillError};

/// Snippet payload returned by the GitLab snippets API.
#[derive(Debug, Clone, Default, Deserialize)]
struct GitLabSnippet {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    web_url: String,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    updated_at: String,
    #[serde(default)]
    author: GitLabAuthor,
    #[serde(default)]
    files: Vec<GitLabFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GitLabAuthor {
    #[serde(default)]
    username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GitLabFile {
    path: String,
    #[serde(default)]
    raw_url: String,
}

impl GitLabSnippet {
    fn into_bundle(self) -> SnippetBundle {
        let description = match self.description {
            Some(desc) if !desc.is_empty() => desc,
            _ => self.title,
        };
        // Snippets expose no revision list; the last update time stands in.
        let history = if self.updated_at.is_empty() {
            Vec::new()
        } else {
            vec![Revision {
                version: self.updated_at.clone(),
            }]
        };
        SnippetBundle {
            id: self.id.to_string(),
            description,
            files: self
                .files
                .into_iter()
                .map(|file| {
                    (
                        file.path,
                        SnippetFile {
                            content: String::new(),
                            raw_url: file.raw_url,
                        },
                    )
                })
                .collect(),
            html_url: self.web_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
            owner: Owner {
                login: self.author.username,
            },
            history,
        }
    }
}

#[derive(Serialize)]
struct CreateSnippet<'a> {
    title: &'a str,
    description: &'a str,
    visibility: &'a str,
    files: Vec<CreateSnippetFile<'a>>,
}

#[derive(Serialize)]
struct CreateSnippetFile<'a> {
    file_path: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone)]
pub struct GitLabProvider {
    runner: CliRunner,
    search_tag: String,
}

impl GitLabProvider {
    pub fn new(binary: impl Into<std::path::PathBuf>, search_tag: impl Into<String>) -> Self {
        Self {
            runner: CliRunner::new(Backend::GitLab.name(), binary),
            search_tag: search_tag.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &ProvidersConfig) -> Self {
        Self::new(&config.gitlab_cli, &config.search_tag)
    }

    fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|err| {
            SkillError::backend(Backend::GitLab.name(), format!("failed to parse {what}: {err}"))
        })
    }
}

const fn visibility_name(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "public",
        Visibility::Secret => "private",
    }
}

impl Provider for GitLabProvider {
    fn backend(&self) -> Backend {
        Backend::GitLab
    }

    fn fetch(&self, id: &str) -> Result<SnippetBundle> {
        debug!(snippet = id, "fetching snippet");
        let out = self.runner.api(&[&format!("/snippets/{id}")])?;
        let snippet: GitLabSnippet = Self::decode(&out, &format!("snippet {id}"))?;
        let mut bundle = snippet.into_bundle();

        for (path, file) in &mut bundle.files {
            let endpoint = format!("/snippets/{id}/files/main/{}/raw", urlencoding::encode(path));
            let raw = self.runner.api(&[&endpoint]).map_err(|err| {
                SkillError::backend(
                    Backend::GitLab.name(),
                    format!("failed to fetch {path} from snippet {id}: {err}"),
                )
            })?;
            file.content = String::from_utf8_lossy(&raw).into_owned();
        }
        Ok(bundle)
    }

    fn create(
        &self,
        description: &str,
        files: &BTreeMap<String, String>,
        visibility: Visibility,
    ) -> Result<SnippetBundle> {
        let payload = CreateSnippet {
            title: description,
            description,
            visibility: visibility_name(visibility),
            files: files
                .iter()
                .map(|(path, content)| CreateSnippetFile {
                    file_path: path,
                    content,
                })
                .collect(),
        };
        let body = serde_json::to_vec(&payload)?;
        debug!(files = files.len(), visibility = payload.visibility, "creating snippet");
        let out = self
            .runner
            .api_with_input(&["/snippets", "--method", "POST"], &body)?;
        let snippet: GitLabSnippet = Self::decode(&out, "created snippet")?;
        Ok(snippet.into_bundle())
    }

    fn search(&self, query: &str) -> Result<Vec<SnippetBundle>> {
        let endpoint = format!(
            "/snippets/public?per_page=100&search={}",
            urlencoding::encode(query.trim())
        );
        let out = self.runner.api(&[&endpoint])?;
        let snippets: Vec<GitLabSnippet> = Self::decode(&out, "search results")?;
        Ok(snippets
            .into_iter()
            .map(GitLabSnippet::into_bundle)
            .filter(|bundle| matches_search(bundle, &self.search_tag, query))
            .collect())
    }

    fn authenticated_user(&self) -> String {
        self.runner
            .api(&["/user", "--jq", ".username"])
            .map(|out| String::from_utf8_lossy(&out).trim().to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNIPPET: &str = r#"{
        "id": 12345,
        "title": "[gh-skill] Weather",
        "description": "",
        "visibility": "public",
        "web_url": "https://gitlab.com/-/snippets/12345",
        "created_at": "2025-01-01T00:00:00.000Z",
        "updated_at": "2025-02-01T00:00:00.000Z",
        "author": {"id": 1, "username": "nico"},
        "files": [
            {"path": "weather.skill.md", "raw_url": "https://gitlab.com/-/snippets/12345/raw/main/weather.skill.md"},
            {"path": "scripts--run.sh", "raw_url": "https://gitlab.com/-/snippets/12345/raw/main/scripts--run.sh"}
        ]
    }"#;

    #[test]
    fn normalizes_snippet() {
        let snippet: GitLabSnippet = serde_json::from_str(SNIPPET).unwrap();
        let bundle = snippet.into_bundle();
        assert_eq!(bundle.id, "12345");
        assert_eq!(bundle.description, "[gh-skill] Weather");
        assert_eq!(bundle.owner(), "nico");
        assert_eq!(bundle.html_url, "https://gitlab.com/-/snippets/12345");
        assert_eq!(bundle.revision(), "2025-02-01T00:00:00.000Z");
        assert_eq!(bundle.files.len(), 2);
        assert!(bundle.files["scripts--run.sh"].content.is_empty());
    }

    #[test]
    fn description_preferred_over_title() {
        let mut snippet: GitLabSnippet = serde_json::from_str(SNIPPET).unwrap();
        snippet.description = Some("[gh-skill] Better".to_string());
        assert_eq!(snippet.into_bundle().description, "[gh-skill] Better");
    }

    #[test]
    fn secret_maps_to_private() {
        assert_eq!(visibility_name(Visibility::Secret), "private");
        assert_eq!(visibility_name(Visibility::Public), "public");
    }

    #[test]
    fn create_payload_shape() {
        let payload = CreateSnippet {
            title: "t",
            description: "t",
            visibility: "private",
            files: vec![CreateSnippetFile {
                file_path: "weather.skill.md",
                content: "body",
            }],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["files"][0]["file_path"], "weather.skill.md");
        assert_eq!(json["visibility"], "private");
    }

    #[cfg(unix)]
    fn fake_glab(dir: &std::path::Path, raw_status: u8) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        std::fs::write(dir.join("snippet.json"), SNIPPET).unwrap();
        let script = format!(
            "#!/bin/sh\ncase \"$2\" in\n  */raw) printf 'raw body'; exit {raw_status} ;;\n  *) cat '{}' ;;\nesac\n",
            dir.join("snippet.json").display()
        );
        let path = dir.join("glab");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn fetch_reads_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = GitLabProvider::new(fake_glab(dir.path(), 0), "[gh-skill]");
        let bundle = provider.fetch("12345").unwrap();
        assert_eq!(bundle.files["weather.skill.md"].content, "raw body");
        assert_eq!(bundle.files["scripts--run.sh"].content, "raw body");
    }

    #[cfg(unix)]
    #[test]
    fn failed_file_fetch_fails_the_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let provider = GitLabProvider::new(fake_glab(dir.path(), 1), "[gh-skill]");
        match provider.fetch("12345").unwrap_err() {
            SkillError::Backend { backend, message } => {
                assert_eq!(backend, "gitlab");
                assert!(message.contains("from snippet 12345"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
