//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use wikiextract::Preset;

#[derive(Parser)]
#[command(name = "wikiextract")]
#[command(about = "Extract plain-text articles from MediaWiki XML dumps")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract articles from a dump into a JSONL file
    Extract(ExtractArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Dump file (.xml.bz2, or uncompressed .xml)
    pub archive: PathBuf,

    /// Output file, one JSON object per line
    #[arg(short, long, default_value = "data/articles.jsonl")]
    pub output: PathBuf,

    /// Stop after this many articles
    #[arg(short = 'n', long, value_name = "N")]
    pub max_articles: Option<usize>,

    /// Minimum characters of cleaned text
    #[arg(long, value_name = "CHARS")]
    pub min_length: Option<usize>,

    /// Truncate cleaned text to this many characters
    #[arg(long, value_name = "CHARS")]
    pub max_length: Option<usize>,

    /// Language preset applied before the other flags (thai)
    #[arg(long, value_name = "NAME")]
    pub preset: Option<Preset>,

    /// Skip titles starting with PREFIX (repeatable, replaces the configured list)
    #[arg(long = "exclude-prefix", value_name = "PREFIX")]
    pub exclude_prefixes: Vec<String>,

    /// Namespace id of articles to keep
    #[arg(long, value_name = "ID", allow_negative_numbers = true)]
    pub namespace: Option<i64>,

    /// Read settings from this TOML file instead of the default location
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Treat the input as uncompressed XML regardless of extension
    #[arg(long)]
    pub plain: bool,

    /// Print run statistics as JSON instead of a summary
    #[arg(long)]
    pub stats_json: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration as TOML
    Show {
        /// Read this file instead of the default location
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Print the default configuration file location
    Path,
}
