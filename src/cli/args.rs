//! CLI argument definitions using clap derive

use crate::artifact::{Coordinate, Repository};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Reprobe - Ordered-fallback artifact resolver
///
/// Looks up artifacts in each configured repository in turn, skipping
/// repositories already known not to have them.
#[derive(Parser, Debug)]
#[command(name = "reprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "REPROBE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve artifacts against the repository list
    Resolve(ResolveArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Coordinates to resolve (group:artifact[:type]:version)
    #[arg(required = true)]
    pub coordinates: Vec<Coordinate>,

    /// Repository in search order (id=location[@policy]); replaces configured ones
    #[arg(short, long = "repo", value_name = "REPO")]
    pub repositories: Vec<Repository>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Do not remember negative lookups
    #[arg(long)]
    pub no_cache_not_found: bool,

    /// Coordinates resolved in parallel
    #[arg(short, long)]
    pub workers: Option<usize>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

impl ConfigArgs {
    /// Whether the action reads the loaded configuration
    pub fn needs_config(&self) -> bool {
        matches!(self.action, None | Some(ConfigAction::Show))
    }
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
