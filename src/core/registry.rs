//! Installed skill registry.
//!
//! Every installed skill lives in `<root>/<name>/` with its primary document
//! renamed to `SKILL.md` and a `.gistskill.json` sidecar describing where it
//! came from. The sidecar is the source of truth for listing and updates.

use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::bundler::{codec, primary};
use crate::core::frontmatter::FrontMatter;
use crate::error::{Result, SkillError};
use crate::providers::{Backend, SnippetBundle, SnippetFile};
use crate::utils::{ensure_dir, write_atomic};

/// Metadata sidecar written next to every installed skill.
pub const SIDECAR_FILE: &str = ".gistskill.json";

/// Registry entry for one installed skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledSkill {
    pub name: String,
    /// Sidecars written before GitLab support carry no provider.
    #[serde(default)]
    pub provider: Backend,
    #[serde(alias = "gist_id")]
    pub bundle_id: String,
    #[serde(default, alias = "commit_sha")]
    pub revision: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, alias = "gist_url")]
    pub url: String,
    pub installed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What an install of a bundle will do, resolved before anything is written.
#[derive(Debug, Clone)]
pub struct InstallPlan<'a> {
    pub primary_key: &'a str,
    pub primary: &'a SnippetFile,
    pub front_matter: FrontMatter,
    /// Canonical local name: front matter, then `<name>.skill.md`, then bundle id.
    pub name: String,
}

impl<'a> InstallPlan<'a> {
    pub fn new(bundle: &'a SnippetBundle) -> Result<Self> {
        let (primary_key, primary) = primary::find_primary(&bundle.files).ok_or_else(|| {
            SkillError::Validation(format!(
                "bundle {} does not contain a *{} or {} file",
                bundle.id,
                primary::SKILL_SUFFIX,
                primary::SKILL_FILE
            ))
        })?;

        let front_matter = FrontMatter::parse(&primary.content).map_err(|err| match err {
            SkillError::Parse(msg) => {
                SkillError::Parse(format!("{primary_key} in bundle {}: {msg}", bundle.id))
            }
            other => other,
        })?;

        let name = [
            front_matter.name.trim(),
            primary::skill_name_from_file(primary_key).unwrap_or_default(),
            bundle.id.trim(),
        ]
        .into_iter()
        .find(|candidate| !candidate.is_empty())
        .unwrap_or_default()
        .to_string();
        validate_skill_name(&name)?;

        Ok(Self {
            primary_key,
            primary,
            front_matter,
            name,
        })
    }

    /// Relative on-disk path for every storage key, in key order.
    ///
    /// Fails before anything is written if any key would land outside the
    /// skill directory.
    pub fn layout(&self, bundle: &'a SnippetBundle) -> Result<Vec<(PathBuf, &'a SnippetFile)>> {
        let mut layout = Vec::with_capacity(bundle.files.len());
        for (key, file) in &bundle.files {
            if key == self.primary_key {
                layout.push((PathBuf::from(primary::SKILL_FILE), file));
                continue;
            }
            let relative = contained_path(&codec::expand(key)).ok_or_else(|| {
                SkillError::Validation(format!(
                    "bundle {} file {key:?} escapes the skill directory",
                    bundle.id
                ))
            })?;
            if relative == Path::new(primary::SKILL_FILE) {
                warn!(bundle = %bundle.id, key = %key, "skipping file that would shadow the primary document");
                continue;
            }
            layout.push((relative, file));
        }
        Ok(layout)
    }
}

/// Reject names that are not a single normal path component.
pub fn validate_skill_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if name.is_empty() || !single || name.contains(['/', '\\', '\0']) {
        return Err(SkillError::Validation(format!(
            "invalid skill name {name:?}: must be a single path component"
        )));
    }
    Ok(())
}

fn contained_path(relative: &str) -> Option<PathBuf> {
    let path = PathBuf::from(relative);
    let contained = path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    contained.then_some(path)
}

/// Write a bundle's files below `dir` according to `plan`. Returns the number
/// of files written.
fn materialize(dir: &Path, bundle: &SnippetBundle, plan: &InstallPlan<'_>) -> Result<usize> {
    let layout = plan.layout(bundle)?;
    ensure_dir(dir)?;
    for (relative, file) in &layout {
        let dest = dir.join(relative);
        if let Some(parent) = dest.parent() {
            ensure_dir(parent)?;
        }
        fs::write(&dest, file.content.as_bytes())
            .map_err(|err| SkillError::fs("write", &dest, err))?;
        debug!(path = %dest.display(), bytes = file.content.len(), "wrote skill file");
    }
    Ok(layout.len())
}

/// Remove everything inside `dir`, keeping the directory itself so that tool
/// links pointing at it stay valid.
fn clear_dir(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir).map_err(|err| SkillError::fs("read directory", dir, err))? {
        let entry = entry.map_err(|err| SkillError::fs("read directory", dir, err))?;
        let path = entry.path();
        let is_dir = entry.file_type().is_ok_and(|kind| kind.is_dir());
        let removed = if is_dir {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|err| SkillError::fs("remove", &path, err))?;
    }
    Ok(())
}

/// Result of downloading a bundle without registering it.
#[derive(Debug, Clone)]
pub struct Download {
    pub name: String,
    pub dir: PathBuf,
    pub files: usize,
}

/// Write a bundle into `<out_dir>/<name>/` without a sidecar.
pub fn download(bundle: &SnippetBundle, out_dir: &Path) -> Result<Download> {
    let plan = InstallPlan::new(bundle)?;
    let dir = out_dir.join(&plan.name);
    let files = materialize(&dir, bundle, &plan)?;
    Ok(Download {
        name: plan.name,
        dir,
        files,
    })
}

#[derive(Debug, Clone)]
pub struct SkillRegistry {
    root: PathBuf,
}

impl SkillRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn skill_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Install `bundle`, or update it in place if a skill of the same name is
    /// already installed.
    pub fn install(&self, bundle: &SnippetBundle, backend: Backend) -> Result<InstalledSkill> {
        let plan = InstallPlan::new(bundle)?;
        self.install_planned(bundle, &plan, backend)
    }

    pub fn install_planned(
        &self,
        bundle: &SnippetBundle,
        plan: &InstallPlan<'_>,
        backend: Backend,
    ) -> Result<InstalledSkill> {
        // Validate the layout before touching an existing installation.
        plan.layout(bundle)?;

        let dir = self.skill_dir(&plan.name);
        let previous = read_sidecar(&dir).ok();
        if dir.is_dir() {
            clear_dir(&dir)?;
        }
        let files = materialize(&dir, bundle, plan)?;

        let now = Utc::now();
        let entry = InstalledSkill {
            name: plan.name.clone(),
            provider: backend,
            bundle_id: bundle.id.clone(),
            revision: bundle.revision().to_string(),
            description: plan.front_matter.description.clone(),
            version: plan.front_matter.version.clone(),
            author: bundle.owner().to_string(),
            url: bundle.html_url.clone(),
            installed_at: previous.as_ref().map_or(now, |prev| prev.installed_at),
            updated_at: now,
        };
        write_sidecar(&dir, &entry)?;

        info!(
            skill = %entry.name,
            backend = %backend,
            bundle = %entry.bundle_id,
            files,
            update = previous.is_some(),
            "installed skill"
        );
        Ok(entry)
    }

    /// All installed skills, sorted by name. Directories without a readable
    /// sidecar are skipped.
    pub fn list(&self) -> Result<Vec<InstalledSkill>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(SkillError::fs("read registry", &self.root, err)),
        };

        let mut skills = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| SkillError::fs("read registry", &self.root, err))?;
            if !entry.file_type().is_ok_and(|kind| kind.is_dir()) {
                continue;
            }
            match read_sidecar(&entry.path()) {
                Ok(skill) => skills.push(skill),
                Err(err) => {
                    debug!(dir = %entry.path().display(), error = %err, "skipping directory without sidecar");
                }
            }
        }
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skills)
    }

    pub fn get(&self, name: &str) -> Result<InstalledSkill> {
        if validate_skill_name(name).is_err() {
            return Err(SkillError::NotFound(format!("skill {name:?}")));
        }
        read_sidecar(&self.skill_dir(name)).map_err(|err| {
            debug!(skill = name, error = %err, "sidecar unavailable");
            SkillError::NotFound(format!("skill {name:?}"))
        })
    }

    /// Files of an installed skill relative to its directory, sidecar excluded.
    pub fn files(&self, name: &str) -> Result<Vec<PathBuf>> {
        let dir = self.skill_dir(name);
        if validate_skill_name(name).is_err() || !dir.is_dir() {
            return Err(SkillError::NotFound(format!("skill {name:?}")));
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry.map_err(|err| {
                SkillError::fs("walk", &dir, std::io::Error::other(err.to_string()))
            })?;
            if !entry.file_type().is_file() || entry.file_name() == SIDECAR_FILE {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&dir) {
                files.push(relative.to_path_buf());
            }
        }
        Ok(files)
    }

    /// Remove an installed skill and any tool links pointing into the registry.
    ///
    /// Returns the links that were removed. Link cleanup is best effort.
    pub fn remove(&self, name: &str, tool_dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let dir = self.skill_dir(name);
        if validate_skill_name(name).is_err() || !dir.is_dir() {
            return Err(SkillError::NotFound(format!("skill {name:?}")));
        }

        let mut unlinked = Vec::new();
        for tool_dir in tool_dirs {
            let link = tool_dir.join(name);
            let Ok(target) = fs::read_link(&link) else {
                continue;
            };
            if !target.starts_with(&self.root) {
                debug!(link = %link.display(), target = %target.display(), "leaving foreign link");
                continue;
            }
            match fs::remove_file(&link) {
                Ok(()) => unlinked.push(link),
                Err(err) => warn!(link = %link.display(), error = %err, "failed to remove tool link"),
            }
        }

        fs::remove_dir_all(&dir).map_err(|err| SkillError::fs("remove", &dir, err))?;
        info!(skill = name, links = unlinked.len(), "removed skill");
        Ok(unlinked)
    }
}

fn read_sidecar(dir: &Path) -> Result<InstalledSkill> {
    let path = dir.join(SIDECAR_FILE);
    let raw = fs::read_to_string(&path).map_err(|err| SkillError::fs("read", &path, err))?;
    serde_json::from_str(&raw)
        .map_err(|err| SkillError::Serialization(format!("sidecar {}: {err}", path.display())))
}

fn write_sidecar(dir: &Path, entry: &InstalledSkill) -> Result<()> {
    let payload = serde_json::to_string_pretty(entry)?;
    write_atomic(dir.join(SIDECAR_FILE), payload.as_bytes())
}
