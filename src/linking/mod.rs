//! Links installed skills into the skill directories of AI coding tools.
//!
//! Each tool reads skills from its own directory. Installing a skill links
//! `<tool dir>/<skill>` to the registry copy, so updates are picked up without
//! relinking.
//!
//! # Supported tools
//!
//! - Claude Code (`~/.claude/skills`)
//! - Copilot (`~/.copilot/skills`)
//! - Cursor (`.cursor/skills`, relative to the current project)
//! - Codex (`~/.codex/skills`)
//! - OpenCode (`~/.opencode/skills`)
//! - OpenClaw (one target per configured agent)

mod openclaw;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, SkillError};
use crate::utils::ensure_dir;

/// A tool that discovers skills from a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolTarget {
    pub name: String,
    pub dir: PathBuf,
    /// Resolved against the working directory rather than home.
    pub project_relative: bool,
}

impl ToolTarget {
    fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            project_relative: false,
        }
    }

    /// A target counts as detected when the tool's own directory exists.
    #[must_use]
    pub fn is_detected(&self) -> bool {
        !self.project_relative && self.dir.parent().is_some_and(Path::is_dir)
    }
}

/// Every known tool target, resolved against one home directory.
#[derive(Debug, Clone)]
pub struct ToolTargets {
    targets: Vec<ToolTarget>,
}

impl ToolTargets {
    pub fn discover(home: &Path) -> Self {
        let mut targets = vec![
            ToolTarget::new("claude-code", home.join(".claude").join("skills")),
            ToolTarget::new("copilot", home.join(".copilot").join("skills")),
            ToolTarget {
                name: "cursor".to_string(),
                dir: Path::new(".cursor").join("skills"),
                project_relative: true,
            },
            ToolTarget::new("codex", home.join(".codex").join("skills")),
            ToolTarget::new("opencode", home.join(".opencode").join("skills")),
        ];
        targets.extend(openclaw::targets(home));
        Self { targets }
    }

    #[must_use]
    pub fn all(&self) -> &[ToolTarget] {
        &self.targets
    }

    #[must_use]
    pub fn detected(&self) -> Vec<&ToolTarget> {
        self.targets.iter().filter(|t| t.is_detected()).collect()
    }

    /// Directories of every known target, detected or not.
    #[must_use]
    pub fn dirs(&self) -> Vec<PathBuf> {
        self.targets.iter().map(|t| t.dir.clone()).collect()
    }

    /// Resolve a target name to its skill directory.
    ///
    /// Bare `openclaw` also matches the first configured OpenClaw agent.
    pub fn target_dir(&self, name: &str) -> Result<&Path> {
        let found = self
            .targets
            .iter()
            .find(|t| t.name == name)
            .or_else(|| {
                (name == openclaw::OPENCLAW)
                    .then(|| self.targets.iter().find(|t| openclaw::is_agent_target(&t.name)))
                    .flatten()
            });
        found.map(|t| t.dir.as_path()).ok_or_else(|| SkillError::UnknownTarget {
            name: name.to_string(),
            known: self
                .targets
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

/// Link `<tool_dir>/<name>` to `skill_dir`, replacing an existing link.
pub fn link(skill_dir: &Path, name: &str, tool_dir: &Path) -> Result<PathBuf> {
    if !skill_dir.is_dir() {
        return Err(SkillError::NotFound(format!("skill {name:?}")));
    }
    ensure_dir(tool_dir)?;

    let link_path = tool_dir.join(name);
    if let Ok(meta) = fs::symlink_metadata(&link_path) {
        if meta.is_dir() {
            return Err(SkillError::Validation(format!(
                "{} already exists and is not a link",
                link_path.display()
            )));
        }
        fs::remove_file(&link_path).map_err(|err| SkillError::fs("replace", &link_path, err))?;
    }

    symlink_dir(skill_dir, &link_path)
        .map_err(|err| SkillError::fs("link", &link_path, err))?;
    debug!(skill = name, link = %link_path.display(), "linked skill");
    Ok(link_path)
}

/// Link a skill into every detected tool. Returns the tool directories linked.
pub fn auto_link(targets: &ToolTargets, skill_dir: &Path, name: &str) -> Vec<PathBuf> {
    targets
        .detected()
        .into_iter()
        .filter_map(|target| match link(skill_dir, name, &target.dir) {
            Ok(_) => Some(target.dir.clone()),
            Err(err) => {
                warn!(skill = name, target = %target.name, error = %err, "failed to link skill");
                None
            }
        })
        .collect()
}

#[cfg(unix)]
fn symlink_dir(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink_dir(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(original, link)
}
