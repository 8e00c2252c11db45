//! Snippet storage backends.
//!
//! Every backend exposes the same four operations through [`Provider`].
//! [`Backend::detect`] maps any user-supplied identifier or URL onto a backend
//! and the identifier that backend understands; it never fails, so malformed
//! identifiers surface later as fetch errors.

mod command;
pub mod github;
pub mod gitlab;
mod types;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::bundler::primary;
use crate::config::ProvidersConfig;
use crate::error::Result;

pub use command::CliRunner;
pub use github::GitHubProvider;
pub use gitlab::GitLabProvider;
pub use types::{Owner, Revision, SnippetBundle, SnippetFile, Visibility};

/// Uniform capability set over a snippet backend.
pub trait Provider {
    /// Which backend this provider talks to.
    fn backend(&self) -> Backend;

    fn fetch(&self, id: &str) -> Result<SnippetBundle>;

    fn create(
        &self,
        description: &str,
        files: &BTreeMap<String, String>,
        visibility: Visibility,
    ) -> Result<SnippetBundle>;

    /// Public skill bundles whose description matches `query`.
    fn search(&self, query: &str) -> Result<Vec<SnippetBundle>>;

    /// Handle of the signed-in user, or an empty string when unknown.
    fn authenticated_user(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    GitHub,
    GitLab,
}

static GITLAB_SNIPPET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gitlab\.com/(?:-/)?snippets/(\d+)").expect("valid regex"));

impl Backend {
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::GitHub, Self::GitLab]
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
        }
    }

    /// Look a backend up by name. Unknown names select GitHub.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("gitlab") {
            Self::GitLab
        } else {
            Self::GitHub
        }
    }

    /// Pick the backend for an identifier or URL and extract its bundle id.
    #[must_use]
    pub fn detect(input: &str) -> (Self, String) {
        let input = input.trim();

        if let Some(id) = GITLAB_SNIPPET
            .captures(input)
            .and_then(|caps| caps.get(1))
        {
            return (Self::GitLab, id.as_str().to_string());
        }

        (Self::GitHub, github::parse_gist_id(input))
    }

    /// Build the provider for this backend.
    #[must_use]
    pub fn provider(self, config: &ProvidersConfig) -> Box<dyn Provider> {
        match self {
            Self::GitHub => Box::new(GitHubProvider::from_config(config)),
            Self::GitLab => Box::new(GitLabProvider::from_config(config)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a search hit looks like a published skill: tagged description
/// containing the query, and (when file names are known) a skill document.
pub(crate) fn matches_search(bundle: &SnippetBundle, tag: &str, query: &str) -> bool {
    let description = bundle.description.to_lowercase();
    if !description.contains(&tag.to_lowercase()) {
        return false;
    }
    if !bundle.files.is_empty() && primary::find_primary(&bundle.files).is_none() {
        return false;
    }
    let query = query.trim().to_lowercase();
    query.is_empty() || description.contains(&query)
}
