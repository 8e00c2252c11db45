//! gistskill - agent skills as gists and snippets

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use gistskill::{Result, SkillError};
use gistskill::app::AppContext;
use gistskill::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&cli, &err);
            ExitCode::from(err.exit_code())
        }
    }
}

/// Robot mode keeps stdout machine-readable; humans get a hint where one helps.
fn report_error(cli: &Cli, err: &SkillError) {
    if cli.robot {
        let error_json = serde_json::json!({
            "error": true,
            "code": err.code(),
            "message": err.to_string(),
        });
        println!("{}", serde_json::to_string(&error_json).unwrap_or_default());
        return;
    }

    eprintln!("Error: {err}");
    match err {
        SkillError::NotFound(_) => eprintln!("  Run `gistskill list` to see installed skills."),
        SkillError::Backend { backend, .. } => {
            let tool = if backend == "gitlab" { "glab" } else { "gh" };
            eprintln!("  Check that `{tool}` is installed and signed in (`{tool} auth status`).");
        }
        _ => {}
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = AppContext::from_cli(cli)?;
    gistskill::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,gistskill=info",
        1 => "info,gistskill=debug",
        2 => "debug,gistskill=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.robot {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
