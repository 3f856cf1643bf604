//! wikiextract - extract plain-text articles from MediaWiki XML dumps

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands, ConfigCommands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet)?;

    match cli.command {
        Commands::Extract(args) => commands::extract::handle(&args),
        Commands::Config(ConfigCommands::Show { config }) => {
            commands::config::handle_show(config.as_deref())
        }
        Commands::Config(ConfigCommands::Path) => commands::config::handle_path(),
        Commands::Completions { shell } => commands::completions::handle(shell),
    }
}

/// Install the log subscriber. Logs go to stderr; stdout carries results.
fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        Level::WARN
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
