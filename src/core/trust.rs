//! Trusted author store.
//!
//! Skills published by a trusted author install without the interactive trust
//! prompt. Author handles compare case-insensitively.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SkillError};
use crate::utils::{read_optional, write_atomic};

/// Filename of the trust store inside the registry root.
pub const TRUST_STORE_FILE: &str = "trusted-authors.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedAuthor {
    pub username: String,
    pub trusted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TrustFile {
    #[serde(default)]
    authors: Vec<TrustedAuthor>,
}

#[derive(Debug, Clone)]
pub struct TrustStore {
    path: PathBuf,
    authors: Vec<TrustedAuthor>,
}

impl TrustStore {
    /// Load the store at `path`; a missing or empty file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let authors = match read_optional(&path)? {
            Some(raw) if !raw.trim().is_empty() => {
                let file: TrustFile = serde_json::from_str(&raw).map_err(|err| {
                    SkillError::Serialization(format!("trust store {}: {err}", path.display()))
                })?;
                file.authors
            }
            _ => Vec::new(),
        };
        debug!(path = %path.display(), authors = authors.len(), "loaded trust store");
        Ok(Self { path, authors })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn authors(&self) -> &[TrustedAuthor] {
        &self.authors
    }

    #[must_use]
    pub fn is_trusted(&self, username: &str) -> bool {
        self.position(username).is_some()
    }

    /// Trust `username`. Returns false if the author was already trusted.
    pub fn add_author(&mut self, username: &str) -> bool {
        if username.is_empty() || self.is_trusted(username) {
            return false;
        }
        self.authors.push(TrustedAuthor {
            username: username.to_string(),
            trusted_at: Utc::now(),
        });
        true
    }

    /// Stop trusting `username`. Returns false if the author was not trusted.
    pub fn remove_author(&mut self, username: &str) -> bool {
        match self.position(username) {
            Some(index) => {
                self.authors.remove(index);
                true
            }
            None => false,
        }
    }

    /// Persist the store, replacing the file atomically.
    pub fn save(&self) -> Result<()> {
        let payload = serde_json::to_string_pretty(&TrustFile {
            authors: self.authors.clone(),
        })?;
        write_atomic(&self.path, payload.as_bytes())?;
        debug!(path = %self.path.display(), authors = self.authors.len(), "saved trust store");
        Ok(())
    }

    fn position(&self, username: &str) -> Option<usize> {
        self.authors
            .iter()
            .position(|author| same_handle(&author.username, username))
    }
}

/// Case-insensitive comparison of author handles.
#[must_use]
pub fn same_handle(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}
