//! Main entry point for the x4-rs CLI

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{Generator, generate};
use std::io;

use x4_rs::cli::{Cli, Commands};
use x4_rs::commands;
use x4_rs::config::Settings;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Set verbosity
    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        log::set_max_level(log::LevelFilter::Error);
    }

    if let Commands::Completions { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let settings = Settings::from_cli(&cli)?;

    // Execute command
    match cli.command {
        Commands::Info => commands::info::execute(&settings),
        Commands::Cat { command } => commands::cat::execute(command, &settings),
        Commands::Catalog(args) => commands::catalog::execute(&args, &settings),
        Commands::Completions { .. } => Ok(()),
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
