//! gistskill fork - Re-publish a skill under your own account

use clap::Args;
use tracing::info;

use super::publish::{Published, backend_for, publish_dir, report};
use crate::app::AppContext;
use crate::bundler::publish::{fork_files, tagged_description};
use crate::error::Result;
use crate::providers::{Backend, Provider, Visibility};

#[derive(Args, Debug)]
pub struct ForkArgs {
    /// Gist/snippet id or URL, or a local skill directory
    pub source: String,

    /// Make the fork publicly discoverable (default: secret)
    #[arg(long)]
    pub public: bool,

    /// Backend for forks of a local directory: github, gitlab
    #[arg(long)]
    pub provider: Option<String>,
}

/// Fetch a remote bundle and create an identical one owned by the current user.
pub fn fork_remote(
    provider: &dyn Provider,
    id: &str,
    tag: &str,
    visibility: Visibility,
) -> Result<Published> {
    let original = provider.fetch(id)?;
    let files = fork_files(&original)?;
    let description = tagged_description(&original.description, tag);
    let created = provider.create(&description, &files, visibility)?;
    info!(original = %original.id, fork = %created.id, "forked bundle");

    let name = crate::core::InstallPlan::new(&created)
        .map(|plan| plan.name)
        .unwrap_or_else(|_| created.id.clone());
    Ok(Published {
        name,
        id: created.id,
        url: created.html_url,
        files: files.len(),
        visibility: visibility.as_str(),
    })
}

pub fn run(ctx: &AppContext, args: &ForkArgs) -> Result<()> {
    let visibility = Visibility::from_public_flag(args.public);
    let tag = &ctx.config.providers.search_tag;
    let local = std::path::Path::new(&args.source);

    let published = if local.is_dir() {
        let backend = backend_for(ctx, args.provider.as_deref());
        publish_dir(ctx.provider(backend).as_ref(), local, tag, visibility)?
    } else {
        let (backend, id) = Backend::detect(&args.source);
        if !ctx.robot() {
            println!("Fetching {backend} bundle {id}...");
        }
        fork_remote(ctx.provider(backend).as_ref(), &id, tag, visibility)?
    };
    report(ctx, &published)
}
