//! gistskill trust - Manage trusted authors

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{self, emit_json, robot_ok};
use crate::error::{Result, SkillError};

#[derive(Args, Debug)]
pub struct TrustArgs {
    /// Author handle to trust
    #[arg(conflicts_with_all = ["remove", "list"])]
    pub user: Option<String>,

    /// Stop trusting an author
    #[arg(long, value_name = "USER", conflicts_with = "list")]
    pub remove: Option<String>,

    /// List trusted authors
    #[arg(long)]
    pub list: bool,
}

#[derive(Serialize)]
struct TrustChange<'a> {
    user: &'a str,
    changed: bool,
}

pub fn run(ctx: &AppContext, args: &TrustArgs) -> Result<()> {
    let mut store = ctx.trust_store()?;

    if args.list {
        if ctx.robot() {
            return emit_json(&robot_ok(store.authors()));
        }
        if store.authors().is_empty() {
            println!("No trusted authors.");
            return Ok(());
        }
        println!("Trusted authors:");
        for author in store.authors() {
            output::detail(format!(
                "{} (trusted {})",
                author.username,
                author.trusted_at.format("%Y-%m-%d")
            ));
        }
        return Ok(());
    }

    if let Some(user) = &args.remove {
        let changed = store.remove_author(user);
        if changed {
            store.save()?;
        }
        if ctx.robot() {
            return emit_json(&robot_ok(TrustChange { user, changed }));
        }
        if changed {
            output::success(format!("Removed {user:?} from trusted authors."));
        } else {
            println!("Author {user:?} was not trusted.");
        }
        return Ok(());
    }

    let user = args
        .user
        .as_deref()
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .ok_or_else(|| SkillError::Validation("provide an author, --remove or --list".to_string()))?;
    let changed = store.add_author(user);
    if changed {
        store.save()?;
    }
    if ctx.robot() {
        return emit_json(&robot_ok(TrustChange { user, changed }));
    }
    output::success(format!("Trusted author {user:?}."));
    Ok(())
}
