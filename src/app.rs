use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::cli::output::OutputMode;
use crate::config::Config;
use crate::core::{SkillRegistry, TRUST_STORE_FILE, TrustGate, TrustStore};
use crate::error::Result;
use crate::linking::ToolTargets;
use crate::providers::{Backend, Provider};

/// Everything a command needs, resolved once from flags, config and env.
pub struct AppContext {
    pub config: Config,
    pub registry: SkillRegistry,
    pub home: PathBuf,
    pub output: OutputMode,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        let mut ctx = Self::new(config)?;
        ctx.output = if cli.robot {
            OutputMode::Robot
        } else {
            OutputMode::Human
        };
        Ok(ctx)
    }

    pub fn new(config: Config) -> Result<Self> {
        let home = config.home()?;
        let registry = SkillRegistry::new(config.registry_root()?);
        Ok(Self {
            config,
            registry,
            home,
            output: OutputMode::Human,
        })
    }

    #[must_use]
    pub fn robot(&self) -> bool {
        self.output == OutputMode::Robot
    }

    #[must_use]
    pub fn trust_store_path(&self) -> PathBuf {
        self.registry.root().join(TRUST_STORE_FILE)
    }

    pub fn trust_store(&self) -> Result<TrustStore> {
        TrustStore::load(self.trust_store_path())
    }

    /// A trust gate configured from `[trust]`.
    #[must_use]
    pub fn gate(&self, bypass: bool) -> TrustGate {
        TrustGate::new(self.trust_store_path())
            .bypass(bypass)
            .preview_lines(self.config.trust.preview_lines)
            .script_extensions(&self.config.trust.script_extensions)
    }

    #[must_use]
    pub fn tool_targets(&self) -> ToolTargets {
        ToolTargets::discover(&self.home)
    }

    #[must_use]
    pub fn provider(&self, backend: Backend) -> Box<dyn Provider> {
        backend.provider(&self.config.providers)
    }

    /// Stdin for prompts.
    #[must_use]
    pub fn prompt_input(&self) -> Box<dyn BufRead> {
        Box::new(io::stdin().lock())
    }

    /// Prompts go to stderr in robot mode so stdout stays valid JSON.
    #[must_use]
    pub fn prompt_output(&self) -> Box<dyn Write> {
        if self.robot() {
            Box::new(io::stderr())
        } else {
            Box::new(io::stdout())
        }
    }
}
