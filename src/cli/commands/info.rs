//! gistskill info - Show details of an installed skill

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::core::InstalledSkill;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Installed skill name
    pub name: String,
}

#[derive(Serialize)]
struct InfoReport {
    #[serde(flatten)]
    skill: InstalledSkill,
    path: PathBuf,
    files: Vec<PathBuf>,
}

pub fn run(ctx: &AppContext, args: &InfoArgs) -> Result<()> {
    let skill = ctx.registry.get(&args.name)?;
    let files = ctx.registry.files(&skill.name)?;
    let path = ctx.registry.skill_dir(&skill.name);

    if ctx.robot() {
        return emit_json(&robot_ok(InfoReport { skill, path, files }));
    }

    let mut layout = HumanLayout::new();
    layout
        .title(&skill.name)
        .kv("Description", &skill.description)
        .kv("Version", &skill.version)
        .kv("Author", &skill.author)
        .kv("Provider", skill.provider.name())
        .kv("Bundle", &skill.bundle_id)
        .kv("Revision", &skill.revision)
        .kv("URL", &skill.url)
        .kv("Installed", &skill.installed_at.to_rfc3339())
        .kv("Updated", &skill.updated_at.to_rfc3339())
        .kv("Path", &path.display().to_string())
        .section("Files");
    for file in &files {
        layout.bullet(&file.display().to_string());
    }
    emit_human(layout);
    Ok(())
}
