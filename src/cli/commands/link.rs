//! gistskill link - Link an installed skill into a tool

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{self, emit_json, robot_ok};
use crate::error::Result;
use crate::linking;

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Installed skill name
    pub name: String,

    /// Tool target: claude-code, copilot, cursor, codex, opencode, openclaw[/<agent>]
    #[arg(long, short)]
    pub target: String,
}

#[derive(Serialize)]
struct LinkReport<'a> {
    name: &'a str,
    target: &'a str,
    link: PathBuf,
}

pub fn run(ctx: &AppContext, args: &LinkArgs) -> Result<()> {
    let targets = ctx.tool_targets();
    let tool_dir = targets.target_dir(&args.target)?;
    let link = linking::link(&ctx.registry.skill_dir(&args.name), &args.name, tool_dir)?;

    if ctx.robot() {
        return emit_json(&robot_ok(LinkReport {
            name: &args.name,
            target: &args.target,
            link,
        }));
    }
    output::success(format!("Linked {:?} to {}", args.name, link.display()));
    Ok(())
}
