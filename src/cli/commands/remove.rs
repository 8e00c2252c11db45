//! gistskill remove - Remove an installed skill

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{self, emit_json, robot_ok};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Installed skill name
    pub name: String,
}

#[derive(Serialize)]
struct RemoveReport<'a> {
    name: &'a str,
    unlinked: Vec<PathBuf>,
}

pub fn run(ctx: &AppContext, args: &RemoveArgs) -> Result<()> {
    let unlinked = ctx
        .registry
        .remove(&args.name, &ctx.tool_targets().dirs())?;

    if ctx.robot() {
        return emit_json(&robot_ok(RemoveReport {
            name: &args.name,
            unlinked,
        }));
    }
    for link in &unlinked {
        output::detail(format!("Unlinked {}", link.display()));
    }
    output::success(format!("Removed skill {:?}", args.name));
    Ok(())
}
