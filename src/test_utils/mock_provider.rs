//! In-memory [`Provider`] for tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::error::{Result, SkillError};
use crate::providers::{
    Backend, Owner, Provider, Revision, SnippetBundle, SnippetFile, Visibility, matches_search,
};

/// A bundle handed to [`Provider::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedBundle {
    pub description: String,
    pub files: BTreeMap<String, String>,
    pub visibility: Visibility,
}

#[derive(Debug)]
pub struct MockProvider {
    backend: Backend,
    user: String,
    search_tag: String,
    bundles: RefCell<BTreeMap<String, SnippetBundle>>,
    created: RefCell<Vec<CreatedBundle>>,
    fetches: Cell<usize>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// A GitHub-flavoured provider with no signed-in user.
    #[must_use]
    pub fn new() -> Self {
        Self {
            backend: Backend::GitHub,
            user: String::new(),
            search_tag: "[gh-skill]".to_string(),
            bundles: RefCell::new(BTreeMap::new()),
            created: RefCell::new(Vec::new()),
            fetches: Cell::new(0),
        }
    }

    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: &str) -> Self {
        self.user = user.to_string();
        self
    }

    #[must_use]
    pub fn with_bundle(self, bundle: SnippetBundle) -> Self {
        self.insert(bundle);
        self
    }

    /// Add or replace a stored bundle.
    pub fn insert(&self, bundle: SnippetBundle) {
        self.bundles.borrow_mut().insert(bundle.id.clone(), bundle);
    }

    #[must_use]
    pub fn created(&self) -> Vec<CreatedBundle> {
        self.created.borrow().clone()
    }

    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl Provider for MockProvider {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn fetch(&self, id: &str) -> Result<SnippetBundle> {
        self.fetches.set(self.fetches.get() + 1);
        self.bundles.borrow().get(id).cloned().ok_or_else(|| {
            SkillError::backend(self.backend.name(), format!("bundle {id} not found"))
        })
    }

    fn create(
        &self,
        description: &str,
        files: &BTreeMap<String, String>,
        visibility: Visibility,
    ) -> Result<SnippetBundle> {
        self.created.borrow_mut().push(CreatedBundle {
            description: description.to_string(),
            files: files.clone(),
            visibility,
        });

        let id = format!("mock{}", self.created.borrow().len());
        let bundle = SnippetBundle {
            id: id.clone(),
            description: description.to_string(),
            files: files
                .iter()
                .map(|(key, content)| {
                    (
                        key.clone(),
                        SnippetFile {
                            content: content.clone(),
                            raw_url: String::new(),
                        },
                    )
                })
                .collect(),
            html_url: format!("https://example.invalid/{id}"),
            owner: Owner {
                login: self.user.clone(),
            },
            history: vec![Revision {
                version: "rev-1".to_string(),
            }],
            ..SnippetBundle::default()
        };
        self.insert(bundle.clone());
        Ok(bundle)
    }

    fn search(&self, query: &str) -> Result<Vec<SnippetBundle>> {
        Ok(self
            .bundles
            .borrow()
            .values()
            .filter(|bundle| matches_search(bundle, &self.search_tag, query))
            .cloned()
            .collect())
    }

    fn authenticated_user(&self) -> String {
        self.user.clone()
    }
}
