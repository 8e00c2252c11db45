//! gistskill list - List installed skills

use clap::Args;
use tracing::debug;

use crate::app::AppContext;
use crate::cli::output::{emit_json, robot_ok};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ListArgs {}

pub fn run(ctx: &AppContext, _args: &ListArgs) -> Result<()> {
    let skills = ctx.registry.list()?;
    debug!(count = skills.len(), root = %ctx.registry.root().display(), "listing skills");

    if ctx.robot() {
        return emit_json(&robot_ok(&skills));
    }
    if skills.is_empty() {
        println!("No skills installed. Use `gistskill add <id>` to install one.");
        return Ok(());
    }

    let width = skills.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for skill in &skills {
        let version = if skill.version.is_empty() {
            "-".to_string()
        } else {
            format!("v{}", skill.version)
        };
        println!(
            "{:width$}  {:10}  {:8}  {}",
            skill.name,
            version,
            skill.provider.name(),
            skill.description,
            width = width
        );
    }
    Ok(())
}
