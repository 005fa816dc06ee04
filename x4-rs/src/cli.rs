//! Root CLI structure for x4-rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "x4-rs")]
#[command(about = "Command-line tools for X4 catalog archives and XML catalogs", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// X4 installation directory
    #[arg(long, env = "X4_GAME_DIR", global = true)]
    pub game_dir: Option<PathBuf>,

    /// Directory the archives are extracted to
    #[arg(long, env = "X4_CACHE_DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long, env = "X4_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the resolved directories and the archives found
    Info,

    /// Catalog archive operations
    Cat {
        #[command(subcommand)]
        command: crate::commands::cat::CatCommands,
    },

    /// Extract the archives and merge their XML into one catalog
    Catalog(crate::commands::catalog::CatalogArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
