//! gistskill search - Search public skills

use clap::Args;
use serde::Serialize;
use tracing::debug;

use crate::app::AppContext;
use crate::bundler::primary;
use crate::cli::commands::publish::backend_for;
use crate::cli::output::{emit_json, robot_ok};
use crate::error::Result;
use crate::providers::SnippetBundle;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Text to look for in skill descriptions (empty lists everything)
    #[arg(default_value = "")]
    pub query: String,

    /// Backend to search: github, gitlab
    #[arg(long)]
    pub provider: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchHit {
    id: String,
    name: String,
    description: String,
    author: String,
    url: String,
}

impl SearchHit {
    fn new(bundle: SnippetBundle, tag: &str) -> Self {
        let name = bundle
            .files
            .keys()
            .find_map(|key| primary::skill_name_from_file(key))
            .unwrap_or(&bundle.id)
            .to_string();
        let description = bundle
            .description
            .strip_prefix(tag)
            .unwrap_or(&bundle.description)
            .trim()
            .to_string();
        Self {
            id: bundle.id.clone(),
            name,
            description,
            author: bundle.owner().to_string(),
            url: bundle.html_url,
        }
    }
}

pub fn run(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let backend = backend_for(ctx, args.provider.as_deref());
    let tag = &ctx.config.providers.search_tag;
    let hits: Vec<SearchHit> = ctx
        .provider(backend)
        .search(&args.query)?
        .into_iter()
        .map(|bundle| SearchHit::new(bundle, tag))
        .collect();
    debug!(backend = %backend, query = %args.query, hits = hits.len(), "search finished");

    if ctx.robot() {
        return emit_json(&robot_ok(&hits));
    }
    if hits.is_empty() {
        println!("No skills found.");
        return Ok(());
    }
    for hit in &hits {
        println!("{}  {}  by {}", hit.name, hit.description, hit.author);
        println!("  gistskill add {}", hit.id);
    }
    Ok(())
}
