//! gistskill publish - Publish a local skill directory

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::app::AppContext;
use crate::bundler::publish;
use crate::cli::output::{self, emit_json, robot_ok};
use crate::error::Result;
use crate::providers::{Backend, Provider, Visibility};

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Skill directory containing SKILL.md
    pub path: PathBuf,

    /// Make the bundle publicly discoverable (default: secret)
    #[arg(long)]
    pub public: bool,

    /// Backend to publish to: github, gitlab
    #[arg(long)]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Published {
    pub name: String,
    pub id: String,
    pub url: String,
    pub files: usize,
    pub visibility: &'static str,
}

/// Collect `dir` and create it as a new bundle.
pub fn publish_dir(
    provider: &dyn Provider,
    dir: &Path,
    tag: &str,
    visibility: Visibility,
) -> Result<Published> {
    let local = publish::collect(dir, tag)?;
    let created = provider.create(&local.description, &local.files, visibility)?;
    info!(skill = %local.name, id = %created.id, backend = %provider.backend(), "published skill");
    Ok(Published {
        name: local.name,
        id: created.id,
        url: created.html_url,
        files: local.files.len(),
        visibility: visibility.as_str(),
    })
}

pub(crate) fn backend_for(ctx: &AppContext, name: Option<&str>) -> Backend {
    name.map_or(ctx.config.providers.default, Backend::from_name)
}

pub(crate) fn report(ctx: &AppContext, published: &Published) -> Result<()> {
    if ctx.robot() {
        return emit_json(&robot_ok(published));
    }
    output::success(format!("Published: {}", published.url));
    output::detail(format!("Install with: gistskill add {}", published.id));
    Ok(())
}

pub fn run(ctx: &AppContext, args: &PublishArgs) -> Result<()> {
    let backend = backend_for(ctx, args.provider.as_deref());
    let visibility = Visibility::from_public_flag(args.public);
    if !ctx.robot() {
        println!("Publishing {} as a {} {backend} bundle...", args.path.display(), visibility.as_str());
    }
    let published = publish_dir(
        ctx.provider(backend).as_ref(),
        &args.path,
        &ctx.config.providers.search_tag,
        visibility,
    )?;
    report(ctx, &published)
}
