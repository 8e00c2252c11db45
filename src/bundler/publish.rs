//! Turn a local skill directory into a flat file map ready for upload.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::{codec, primary};
use crate::core::frontmatter::FrontMatter;
use crate::error::{Result, SkillError};
use crate::providers::SnippetBundle;

/// A skill ready to hand to [`crate::providers::Provider::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishBundle {
    pub name: String,
    pub description: String,
    pub files: BTreeMap<String, String>,
}

/// Prefix `description` with the search tag unless it already carries it.
#[must_use]
pub fn tagged_description(description: &str, tag: &str) -> String {
    let description = description.trim();
    if tag.is_empty() || description.starts_with(tag) {
        description.to_string()
    } else if description.is_empty() {
        tag.to_string()
    } else {
        format!("{tag} {description}")
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Walk `dir` and collect every non-hidden file under its storage key.
///
/// `SKILL.md` at the top level becomes `<name>.skill.md`.
pub fn collect(dir: &Path, tag: &str) -> Result<PublishBundle> {
    if !dir.is_dir() {
        return Err(SkillError::Validation(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    let skill_path = dir.join(primary::SKILL_FILE);
    if !skill_path.is_file() {
        return Err(SkillError::Validation(format!(
            "{} must contain a {} file",
            dir.display(),
            primary::SKILL_FILE
        )));
    }

    let skill = fs::read_to_string(&skill_path)
        .map_err(|err| SkillError::fs("read", &skill_path, err))?;
    let front_matter = FrontMatter::parse(&skill)?;

    let name = if front_matter.name.trim().is_empty() {
        dir_name(dir)
    } else {
        front_matter.name.trim().to_string()
    };
    let description = if front_matter.description.trim().is_empty() {
        name.clone()
    } else {
        front_matter.description.clone()
    };

    let mut files = BTreeMap::new();
    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry))
    {
        let entry = entry.map_err(|err| {
            SkillError::fs("walk", dir, std::io::Error::other(err.to_string()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let Ok(content) = fs::read_to_string(entry.path()) else {
            warn!(path = %entry.path().display(), "skipping unreadable or non-UTF-8 file");
            continue;
        };

        let mut key = codec::flatten(&relative.to_string_lossy());
        if key == primary::SKILL_FILE {
            key = primary::skill_file_name(&name);
        }
        debug!(key = %key, bytes = content.len(), "collected file");
        files.insert(key, content);
    }

    Ok(PublishBundle {
        description: tagged_description(&description, tag),
        name,
        files,
    })
}

/// File map for re-publishing a fetched bundle under the current user.
pub fn fork_files(bundle: &SnippetBundle) -> Result<BTreeMap<String, String>> {
    if primary::find_primary(&bundle.files).is_none() {
        return Err(SkillError::Validation(format!(
            "bundle {} does not contain a *{} file",
            bundle.id,
            primary::SKILL_SUFFIX
        )));
    }
    Ok(bundle.contents())
}

fn dir_name(dir: &Path) -> String {
    dir.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(dir)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "skill".to_string())
}
