mod add;
mod cli;
mod close;
mod commits;
mod error;
mod normalize;
mod notes;
mod progress;
mod report;
mod ui;
mod workspace;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use error::Result;
use report::CommandReport;
use std::process;
use tracing_subscriber::EnvFilter;
use workspace::Workspace;

fn init_tracing(verbose: bool) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) if verbose => "warn,changelog=debug,git=debug,keep_changelog=debug".to_string(),
        Err(_) => "warn".to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<CommandReport> {
    let workspace = Workspace::load(&cli.dir, cli.config.as_deref())?;
    let quiet = cli.json;

    match cli.command {
        Commands::Add {
            title,
            label,
            url,
            categories,
            breaking,
            authors,
            repo_url,
            commit,
        } => add::execute(
            &workspace,
            add::AddArgs {
                title,
                label,
                url,
                categories,
                breaking,
                authors,
                repo_url,
                commit,
            },
            quiet,
        ),
        Commands::Commits {
            from,
            to,
            repo_url,
            commit,
        } => commits::execute(
            &workspace,
            commits::CommitsArgs {
                from,
                to,
                repo_url,
                commit,
            },
            quiet,
        ),
        Commands::Close {
            version,
            date,
            release_notes,
            linked_channels,
            commit,
        } => close::execute(
            &workspace,
            close::CloseArgs {
                version,
                date,
                release_notes,
                linked_channels,
                commit,
            },
            quiet,
        ),
        Commands::Notes { version } => notes::execute(&workspace, &version),
        Commands::Normalize => normalize::execute(&workspace),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let (json, verbose) = (cli.json, cli.verbose);

    let result = run(cli).and_then(|report| {
        report.print(json, verbose)?;
        Ok(report.status.is_success())
    });

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            if json {
                let status = changelog::HandlerStatus::failure(err.user_message());
                println!("{}", serde_json::to_string_pretty(&status).unwrap_or_default());
            } else {
                eprintln!("{} {}", "Error:".bold().red(), err.user_message());
            }
            process::exit(1);
        }
    }
}
