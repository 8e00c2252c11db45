//! gistskill install - Download a skill without registering it

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::{self, emit_json, robot_ok};
use crate::core::{InstallPlan, download};
use crate::error::{Result, SkillError};
use crate::providers::Backend;

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Gist/snippet id or URL
    pub id: String,

    /// Output directory (default: current directory)
    #[arg(long, short = 'o', default_value = ".")]
    pub output: PathBuf,
}

/// What to do with a destination directory that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existing {
    Replace,
    Backup,
    Abort,
}

impl Existing {
    fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "r" | "replace" => Self::Replace,
            "b" | "backup" => Self::Backup,
            _ => Self::Abort,
        }
    }
}

/// Ask what to do about an existing destination.
pub fn ask_existing<R: BufRead, W: Write>(dir: &Path, input: &mut R, out: &mut W) -> Result<Existing> {
    writeln!(out, "Directory {} already exists.", dir.display())?;
    write!(out, "  [r]eplace / [b]ackup / [A]bort? ")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(Existing::parse(&line))
}

/// Clear `dir` according to `choice`. Returns the backup location, if any.
pub fn clear_destination(dir: &Path, choice: Existing) -> Result<Option<PathBuf>> {
    match choice {
        Existing::Abort => Ok(None),
        Existing::Replace => {
            fs::remove_dir_all(dir).map_err(|err| SkillError::fs("remove", dir, err))?;
            Ok(None)
        }
        Existing::Backup => {
            let mut backup = dir.as_os_str().to_owned();
            backup.push(".bak");
            let backup = PathBuf::from(backup);
            if backup.exists() {
                fs::remove_dir_all(&backup).map_err(|err| SkillError::fs("remove", &backup, err))?;
            }
            fs::rename(dir, &backup).map_err(|err| SkillError::fs("back up", dir, err))?;
            Ok(Some(backup))
        }
    }
}

#[derive(Debug, Serialize)]
struct InstallReport {
    name: String,
    dir: PathBuf,
    files: usize,
    backup: Option<PathBuf>,
}

pub fn run(ctx: &AppContext, args: &InstallArgs) -> Result<()> {
    let (backend, id) = Backend::detect(&args.id);
    if !ctx.robot() {
        println!("Fetching {backend} bundle {id}...");
    }
    let bundle = ctx.provider(backend).fetch(&id)?;
    let plan = InstallPlan::new(&bundle)?;
    let dest = args.output.join(&plan.name);

    let mut backup = None;
    if dest.is_dir() {
        if ctx.robot() {
            return Err(SkillError::Validation(format!(
                "{} already exists",
                dest.display()
            )));
        }
        let choice = ask_existing(&dest, &mut ctx.prompt_input(), &mut ctx.prompt_output())?;
        if choice == Existing::Abort {
            println!("Aborted.");
            return Ok(());
        }
        backup = clear_destination(&dest, choice)?;
    }

    let result = download(&bundle, &args.output)?;
    info!(skill = %result.name, dir = %result.dir.display(), files = result.files, "downloaded skill");

    if ctx.robot() {
        return emit_json(&robot_ok(InstallReport {
            name: result.name,
            dir: result.dir,
            files: result.files,
            backup,
        }));
    }
    if let Some(backup) = &backup {
        output::detail(format!("Backed up to {}", backup.display()));
    }
    output::success(format!(
        "Installed {} files to {}",
        result.files,
        result.dir.display()
    ));
    Ok(())
}
