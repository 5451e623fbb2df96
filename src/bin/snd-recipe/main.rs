//! snd-recipe CLI - host for the snd package lifecycle

use anyhow::Result;
use clap::Parser;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

use snd_recipe::lifecycle::LifecycleError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);

        // Lifecycle failures exit with a code naming the failing stage.
        let code = match e.downcast_ref::<LifecycleError>() {
            Some(failure) => {
                if let Some(help) = failure.help() {
                    eprintln!("help: {}", help);
                }
                failure.exit_code()
            }
            None => 1,
        };
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging. stdout carries command output.
    let filter = if cli.verbose {
        EnvFilter::new("snd_recipe=debug")
    } else {
        EnvFilter::new("snd_recipe=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Create(args) => commands::create::execute(args),
        Commands::Export(args) => commands::export::execute(args),
        Commands::Inspect(args) => commands::inspect::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
