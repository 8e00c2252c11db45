//! OpenClaw agent discovery.
//!
//! OpenClaw runs several agents, each with its own workspace. Agents are read
//! from `~/.openclaw/openclaw.json`; without a usable config the legacy
//! `~/.chad/skills` directory is the only target.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::ToolTarget;

pub const OPENCLAW: &str = "openclaw";
const AGENT_PREFIX: &str = "openclaw/";

#[derive(Debug, Default, Deserialize)]
struct OpenClawConfig {
    #[serde(default)]
    agents: Agents,
}

#[derive(Debug, Default, Deserialize)]
struct Agents {
    #[serde(default)]
    defaults: AgentDefaults,
    #[serde(default)]
    list: Vec<Agent>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentDefaults {
    #[serde(default)]
    workspace: String,
}

#[derive(Debug, Default, Deserialize)]
struct Agent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    workspace: String,
}

fn legacy_workspace(home: &Path) -> PathBuf {
    home.join(".chad")
}

fn fallback(home: &Path) -> Vec<ToolTarget> {
    vec![ToolTarget::new(OPENCLAW, legacy_workspace(home).join("skills"))]
}

pub(super) fn is_agent_target(name: &str) -> bool {
    name.len() > AGENT_PREFIX.len() && name.starts_with(AGENT_PREFIX)
}

/// One target per configured agent, or the legacy target.
pub(super) fn targets(home: &Path) -> Vec<ToolTarget> {
    let path = home.join(".openclaw").join("openclaw.json");
    let Ok(raw) = fs::read_to_string(&path) else {
        return fallback(home);
    };
    let config: OpenClawConfig = match serde_json::from_str(&raw) {
        Ok(config) => config,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "ignoring unreadable openclaw config");
            return fallback(home);
        }
    };

    let default_workspace = if config.agents.defaults.workspace.is_empty() {
        legacy_workspace(home)
    } else {
        PathBuf::from(&config.agents.defaults.workspace)
    };

    let targets: Vec<ToolTarget> = config
        .agents
        .list
        .iter()
        .map(|agent| {
            let workspace = if agent.workspace.is_empty() {
                default_workspace.clone()
            } else {
                PathBuf::from(&agent.workspace)
            };
            let label = if agent.name.is_empty() { &agent.id } else { &agent.name };
            ToolTarget::new(format!("{AGENT_PREFIX}{label}"), workspace.join("skills"))
        })
        .collect();

    if targets.is_empty() {
        vec![ToolTarget::new(OPENCLAW, default_workspace.join("skills"))]
    } else {
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_legacy_dir() {
        let home = tempfile::tempdir().unwrap();
        let targets = targets(home.path());
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, "openclaw");
        assert_eq!(targets[0].dir, home.path().join(".chad/skills"));
    }

    #[test]
    fn corrupt_config_uses_legacy_dir() {
        let home = tempfile::tempdir().unwrap();
        fs::create_dir_all(home.path().join(".openclaw")).unwrap();
        fs::write(home.path().join(".openclaw/openclaw.json"), "{").unwrap();
        assert_eq!(targets(home.path())[0].name, "openclaw");
    }

    #[test]
    fn reads_agents() {
        let home = tempfile::tempdir().unwrap();
        fs::create_dir_all(home.path().join(".openclaw")).unwrap();
        let config = serde_json::json!({
            "agents": {
                "defaults": {"workspace": "/srv/claw"},
                "list": [
                    {"id": "main", "name": "Chad"},
                    {"id": "ops", "workspace": "/srv/ops"}
                ]
            }
        });
        fs::write(home.path().join(".openclaw/openclaw.json"), config.to_string()).unwrap();

        let targets = targets(home.path());
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].name, "openclaw/Chad");
        assert_eq!(targets[0].dir, PathBuf::from("/srv/claw/skills"));
        assert_eq!(targets[1].name, "openclaw/ops");
        assert_eq!(targets[1].dir, PathBuf::from("/srv/ops/skills"));
    }

    #[test]
    fn empty_agent_list_uses_default_workspace() {
        let home = tempfile::tempdir().unwrap();
        fs::create_dir_all(home.path().join(".openclaw")).unwrap();
        fs::write(home.path().join(".openclaw/openclaw.json"), r#"{"agents":{}}"#).unwrap();
        let targets = targets(home.path());
        assert_eq!(targets[0].name, "openclaw");
        assert_eq!(targets[0].dir, home.path().join(".chad/skills"));
    }
}
