//! gistskill update - Refresh installed skills from their source

use clap::Args;
use serde::Serialize;
use tracing::{info, warn};

use crate::app::AppContext;
use crate::cli::output::{self, emit_json, robot_ok, robot_partial};
use crate::core::InstallPlan;
use crate::error::{Result, SkillError};
use crate::providers::Provider;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Installed skill name
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub name: Option<String>,

    /// Update every installed skill
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateResult {
    pub name: String,
    pub version: String,
    pub previous_revision: String,
    pub revision: String,
}

impl UpdateResult {
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous_revision != self.revision
    }
}

/// Re-fetch an installed skill and reinstall it under its existing name.
///
/// Updates skip the trust prompt: the skill was accepted when it was added.
pub fn update_skill(ctx: &AppContext, provider: &dyn Provider, name: &str) -> Result<UpdateResult> {
    let current = ctx.registry.get(name)?;
    let bundle = provider.fetch(&current.bundle_id)?;
    let mut plan = InstallPlan::new(&bundle)?;
    if plan.name != current.name {
        warn!(skill = %current.name, remote = %plan.name, "remote skill was renamed; keeping local name");
        plan.name.clone_from(&current.name);
    }

    let entry = ctx.registry.install_planned(&bundle, &plan, provider.backend())?;
    info!(skill = %entry.name, revision = %entry.revision, "updated skill");
    Ok(UpdateResult {
        name: entry.name,
        version: entry.version,
        previous_revision: current.revision,
        revision: entry.revision,
    })
}

pub fn run(ctx: &AppContext, args: &UpdateArgs) -> Result<()> {
    let names: Vec<String> = if args.all {
        ctx.registry.list()?.into_iter().map(|s| s.name).collect()
    } else {
        let name = args
            .name
            .clone()
            .ok_or_else(|| SkillError::Validation("provide a skill name or use --all".to_string()))?;
        vec![name]
    };

    if names.is_empty() {
        if ctx.robot() {
            return emit_json(&robot_ok(Vec::<UpdateResult>::new()));
        }
        println!("No skills installed.");
        return Ok(());
    }

    let mut updated = Vec::new();
    let mut failures = Vec::new();
    for name in &names {
        let result = ctx
            .registry
            .get(name)
            .and_then(|current| update_skill(ctx, ctx.provider(current.provider).as_ref(), name));
        match result {
            Ok(result) => {
                if !ctx.robot() {
                    let version = if result.version.is_empty() {
                        String::new()
                    } else {
                        format!(" to v{}", result.version)
                    };
                    if result.changed() {
                        output::success(format!("Updated {:?}{version}", result.name));
                    } else {
                        output::success(format!("{:?} is up to date", result.name));
                    }
                }
                updated.push(result);
            }
            // A single named skill fails the command; --all keeps going.
            Err(err) if !args.all => return Err(err),
            Err(err) => {
                if !ctx.robot() {
                    eprintln!("✗ Failed to update {name}: {err}");
                }
                failures.push(format!("{name}: {err}"));
            }
        }
    }

    if ctx.robot() {
        let completed = updated.len();
        return emit_json(&robot_partial(updated, completed, failures));
    }
    Ok(())
}
