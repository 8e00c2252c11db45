//! GitHub Gists backend, driven through the `gh` CLI.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::command::CliRunner;
use super::{Backend, Provider, SnippetBundle, Visibility, matches_search};
use crate::config::ProvidersConfig;
use crate::error::{Result, SkillError};

const GIST_HOST: &str = "gist.github.com";

/// Extract a gist id from a gist URL; anything else is returned trimmed.
#[must_use]
pub fn parse_gist_id(input: &str) -> String {
    let input = input.trim();
    if !input.contains(GIST_HOST) {
        return input.to_string();
    }
    let path = input
        .split(['#', '?'])
        .next()
        .unwrap_or(input)
        .trim_end_matches('/');
    path.rsplit('/').next().unwrap_or(path).to_string()
}

#[derive(Debug, Clone)]
pub struct GitHubProvider {
    runner: CliRunner,
    search_tag: String,
}

#[derive(Serialize)]
struct CreateGist<'a> {
    description: &'a str,
    public: bool,
    files: BTreeMap<&'a str, GistContent<'a>>,
}

#[derive(Serialize)]
struct GistContent<'a> {
    content: &'a str,
}

impl GitHubProvider {
    pub fn new(binary: impl Into<std::path::PathBuf>, search_tag: impl Into<String>) -> Self {
        Self {
            runner: CliRunner::new(Backend::GitHub.name(), binary),
            search_tag: search_tag.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &ProvidersConfig) -> Self {
        Self::new(&config.github_cli, &config.search_tag)
    }

    fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|err| {
            SkillError::backend(Backend::GitHub.name(), format!("failed to parse {what}: {err}"))
        })
    }
}

impl Provider for GitHubProvider {
    fn backend(&self) -> Backend {
        Backend::GitHub
    }

    fn fetch(&self, id: &str) -> Result<SnippetBundle> {
        debug!(gist = id, "fetching gist");
        let out = self.runner.api(&[&format!("/gists/{id}")])?;
        Self::decode(&out, &format!("gist {id}"))
    }

    fn create(
        &self,
        description: &str,
        files: &BTreeMap<String, String>,
        visibility: Visibility,
    ) -> Result<SnippetBundle> {
        let payload = CreateGist {
            description,
            public: visibility.is_public(),
            files: files
                .iter()
                .map(|(name, content)| (name.as_str(), GistContent { content }))
                .collect(),
        };
        let body = serde_json::to_vec(&payload)?;
        debug!(files = files.len(), visibility = visibility.as_str(), "creating gist");
        let out = self
            .runner
            .api_with_input(&["/gists", "--method", "POST"], &body)?;
        Self::decode(&out, "created gist")
    }

    fn search(&self, query: &str) -> Result<Vec<SnippetBundle>> {
        let out = self.runner.api(&["/gists/public?per_page=100"])?;
        let gists: Vec<SnippetBundle> = Self::decode(&out, "search results")?;
        Ok(gists
            .into_iter()
            .filter(|gist| matches_search(gist, &self.search_tag, query))
            .collect())
    }

    fn authenticated_user(&self) -> String {
        self.runner
            .api(&["user", "--jq", ".login"])
            .map(|out| String::from_utf8_lossy(&out).trim().to_string())
            .unwrap_or_default()
    }
}
