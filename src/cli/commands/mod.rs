//! CLI command implementations
//!
//! Each subcommand has its own module with an Args struct and a `run`
//! function.

use clap::Subcommand;

pub mod add;
pub mod fork;
pub mod info;
pub mod install;
pub mod link;
pub mod list;
pub mod publish;
pub mod remove;
pub mod search;
pub mod trust;
pub mod update;

use crate::app::AppContext;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Add(args) => add::run(ctx, args),
        Commands::Install(args) => install::run(ctx, args),
        Commands::List(args) => list::run(ctx, args),
        Commands::Info(args) => info::run(ctx, args),
        Commands::Remove(args) => remove::run(ctx, args),
        Commands::Update(args) => update::run(ctx, args),
        Commands::Publish(args) => publish::run(ctx, args),
        Commands::Fork(args) => fork::run(ctx, args),
        Commands::Search(args) => search::run(ctx, args),
        Commands::Link(args) => link::run(ctx, args),
        Commands::Trust(args) => trust::run(ctx, args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a skill into the registry and link it into detected tools
    Add(add::AddArgs),

    /// Download a skill into a directory without registering it
    Install(install::InstallArgs),

    /// List installed skills
    #[command(visible_alias = "ls")]
    List(list::ListArgs),

    /// Show details of an installed skill
    Info(info::InfoArgs),

    /// Remove an installed skill and its tool links
    #[command(visible_alias = "rm")]
    Remove(remove::RemoveArgs),

    /// Update installed skills from their source
    Update(update::UpdateArgs),

    /// Publish a local skill directory
    Publish(publish::PublishArgs),

    /// Re-publish a skill under your own account
    Fork(fork::ForkArgs),

    /// Search public skills
    Search(search::SearchArgs),

    /// Link an installed skill into a tool's skill directory
    Link(link::LinkArgs),

    /// Manage trusted authors
    Trust(trust::TrustArgs),
}
