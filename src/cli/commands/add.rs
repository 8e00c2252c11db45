//! gistskill add - Install a skill into the registry

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::{self, emit_json, robot_ok};
use crate::core::{GateOutcome, InstallPlan, InstalledSkill};
use crate::error::Result;
use crate::linking;
use crate::providers::{Backend, Provider};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Gist/snippet id or URL
    pub id: String,

    /// Skip the trust prompt
    #[arg(long, short = 'y', alias = "idgaf")]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
pub struct AddReport {
    pub skill: InstalledSkill,
    pub decision: GateOutcome,
    pub linked: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AddOutcome {
    Installed(AddReport),
    Aborted { name: String },
}

/// Fetch, gate, install and link one bundle.
///
/// Nothing is written when the gate aborts. Front matter and the primary
/// document are validated before the user is asked anything.
pub fn add_bundle<R: BufRead, W: Write>(
    ctx: &AppContext,
    provider: &dyn Provider,
    id: &str,
    bypass: bool,
    input: &mut R,
    out: &mut W,
) -> Result<AddOutcome> {
    let bundle = provider.fetch(id)?;
    let plan = InstallPlan::new(&bundle)?;

    let decision = ctx
        .gate(bypass)
        .decide(&bundle, &plan, provider, input, out)?;
    if !decision.proceeds() {
        info!(skill = %plan.name, "install aborted at trust prompt");
        return Ok(AddOutcome::Aborted { name: plan.name });
    }

    let skill = ctx.registry.install_planned(&bundle, &plan, provider.backend())?;
    let linked = if ctx.config.linking.auto_link {
        linking::auto_link(
            &ctx.tool_targets(),
            &ctx.registry.skill_dir(&skill.name),
            &skill.name,
        )
    } else {
        Vec::new()
    };

    Ok(AddOutcome::Installed(AddReport {
        skill,
        decision,
        linked,
    }))
}

pub fn run(ctx: &AppContext, args: &AddArgs) -> Result<()> {
    let (backend, id) = Backend::detect(&args.id);
    let provider = ctx.provider(backend);
    if !ctx.robot() {
        println!("Fetching {backend} bundle {id}...");
    }

    let mut input = ctx.prompt_input();
    let mut out = ctx.prompt_output();
    let outcome = add_bundle(ctx, provider.as_ref(), &id, args.yes, &mut input, &mut out)?;

    if ctx.robot() {
        return emit_json(&robot_ok(&outcome));
    }
    match &outcome {
        AddOutcome::Aborted { .. } => println!("Aborted."),
        AddOutcome::Installed(report) => {
            match report.decision {
                GateOutcome::AlreadyTrusted => {
                    output::detail(format!("Author {:?} is trusted.", report.skill.author));
                }
                GateOutcome::InstallAndTrustAuthor => {
                    output::success(format!(
                        "Trusted author {:?} for future installs.",
                        report.skill.author
                    ));
                }
                _ => {}
            }
            let version = if report.skill.version.is_empty() {
                String::new()
            } else {
                format!(" (v{})", report.skill.version)
            };
            output::success(format!("Installed skill {:?}{version}", report.skill.name));
            for dir in &report.linked {
                output::detail(format!("-> Linked to {}", dir.display()));
            }
        }
    }
    Ok(())
}
