use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::gate::{DEFAULT_PREVIEW_LINES, DEFAULT_SCRIPT_EXTENSIONS};
use crate::error::{Result, SkillError};
use crate::providers::Backend;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub trust: TrustConfig,
    #[serde(default)]
    pub linking: LinkingConfig,
}

impl Config {
    /// Defaults, then the config file, then `GISTSKILL_*` environment overrides.
    ///
    /// An explicit path (argument or `GISTSKILL_CONFIG`) replaces the global
    /// `<config dir>/gistskill/config.toml` lookup.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let lookup = |key: &str| std::env::var(key).ok();
        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| lookup("GISTSKILL_CONFIG").map(PathBuf::from));
        let file = explicit.or_else(Self::global_path);
        Self::load_with(file.as_deref(), lookup)
    }

    /// Like [`Config::load`] with an explicit file and environment lookup.
    pub fn load_with(path: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = path
            && let Some(patch) = Self::load_patch(path)?
        {
            config.merge_patch(patch);
        }
        config.apply_env_overrides(env)?;
        Ok(config)
    }

    #[must_use]
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gistskill").join("config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| SkillError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SkillError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.registry {
            self.registry.merge(patch);
        }
        if let Some(patch) = patch.providers {
            self.providers.merge(patch);
        }
        if let Some(patch) = patch.trust {
            self.trust.merge(patch);
        }
        if let Some(patch) = patch.linking {
            self.linking.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(root) = env("GISTSKILL_ROOT").filter(|v| !v.is_empty()) {
            self.registry.root = root;
        }
        if let Some(name) = env("GISTSKILL_PROVIDER").filter(|v| !v.is_empty()) {
            self.providers.default = parse_backend("GISTSKILL_PROVIDER", &name)?;
        }
        if let Some(path) = env("GISTSKILL_GH_PATH").filter(|v| !v.is_empty()) {
            self.providers.github_cli = path;
        }
        if let Some(path) = env("GISTSKILL_GLAB_PATH").filter(|v| !v.is_empty()) {
            self.providers.gitlab_cli = path;
        }
        if let Some(value) = env("GISTSKILL_PREVIEW_LINES") {
            self.trust.preview_lines = value.parse::<usize>().map_err(|err| {
                SkillError::Config(format!("invalid GISTSKILL_PREVIEW_LINES value {value}: {err}"))
            })?;
        }
        if let Some(value) = env("GISTSKILL_AUTO_LINK") {
            self.linking.auto_link = parse_bool("GISTSKILL_AUTO_LINK", &value)?;
        }
        Ok(())
    }

    /// Home directory used to resolve `~` and tool targets.
    pub fn home(&self) -> Result<PathBuf> {
        match &self.linking.home {
            Some(home) => Ok(PathBuf::from(home)),
            None => dirs::home_dir()
                .ok_or_else(|| SkillError::Config("home directory not found".to_string())),
        }
    }

    /// Registry root with `~` expanded.
    pub fn registry_root(&self) -> Result<PathBuf> {
        Ok(expand_tilde(&self.registry.root, &self.home()?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub root: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root: "~/.gistskills".to_string(),
        }
    }
}

impl RegistryConfig {
    fn merge(&mut self, patch: RegistryPatch) {
        if let Some(root) = patch.root {
            self.root = root;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Backend used when an identifier does not name one (publish, search).
    #[serde(default)]
    pub default: Backend,
    #[serde(default)]
    pub github_cli: String,
    #[serde(default)]
    pub gitlab_cli: String,
    /// Marker every published description starts with; search filters on it.
    #[serde(default)]
    pub search_tag: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            default: Backend::GitHub,
            github_cli: "gh".to_string(),
            gitlab_cli: "glab".to_string(),
            search_tag: "[gh-skill]".to_string(),
        }
    }
}

impl ProvidersConfig {
    fn merge(&mut self, patch: ProvidersPatch) {
        if let Some(name) = patch.default {
            self.default = Backend::from_name(&name);
        }
        if let Some(cli) = patch.github_cli {
            self.github_cli = cli;
        }
        if let Some(cli) = patch.gitlab_cli {
            self.gitlab_cli = cli;
        }
        if let Some(tag) = patch.search_tag {
            self.search_tag = tag;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustConfig {
    #[serde(default)]
    pub preview_lines: usize,
    #[serde(default)]
    pub script_extensions: Vec<String>,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            preview_lines: DEFAULT_PREVIEW_LINES,
            script_extensions: DEFAULT_SCRIPT_EXTENSIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl TrustConfig {
    fn merge(&mut self, patch: TrustPatch) {
        if let Some(lines) = patch.preview_lines {
            self.preview_lines = lines;
        }
        if let Some(extensions) = patch.script_extensions {
            self.script_extensions = extensions
                .into_iter()
                .map(|ext| {
                    if ext.starts_with('.') {
                        ext
                    } else {
                        format!(".{ext}")
                    }
                })
                .collect();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkingConfig {
    #[serde(default)]
    pub auto_link: bool,
    #[serde(default)]
    pub home: Option<String>,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            auto_link: true,
            home: None,
        }
    }
}

impl LinkingConfig {
    fn merge(&mut self, patch: LinkingPatch) {
        if let Some(auto_link) = patch.auto_link {
            self.auto_link = auto_link;
        }
        if let Some(home) = patch.home {
            self.home = Some(home);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub registry: Option<RegistryPatch>,
    pub providers: Option<ProvidersPatch>,
    pub trust: Option<TrustPatch>,
    pub linking: Option<LinkingPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RegistryPatch {
    pub root: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ProvidersPatch {
    pub default: Option<String>,
    pub github_cli: Option<String>,
    pub gitlab_cli: Option<String>,
    pub search_tag: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TrustPatch {
    pub preview_lines: Option<usize>,
    pub script_extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LinkingPatch {
    pub auto_link: Option<bool>,
    pub home: Option<String>,
}

/// Expand a leading `~` against `home`.
#[must_use]
pub fn expand_tilde(input: &str, home: &Path) -> PathBuf {
    if input == "~" {
        return home.to_path_buf();
    }
    if let Some(stripped) = input.strip_prefix("~/") {
        return home.join(stripped);
    }
    PathBuf::from(input)
}

fn parse_backend(key: &str, value: &str) -> Result<Backend> {
    Backend::all()
        .iter()
        .copied()
        .find(|backend| backend.name().eq_ignore_ascii_case(value.trim()))
        .ok_or_else(|| SkillError::Config(format!("invalid {key} value {value}: unknown provider")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SkillError::Config(format!("invalid {key} value {value}: expected a boolean"))),
    }
}
