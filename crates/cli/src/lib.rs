pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "stockroom",
    about = "Stockroom operator CLI",
    long_about = "Operate the stockroom catalog service: inspect configuration, run readiness checks, and seed demo catalog data.",
    after_help = "Examples:\n  stockroom doctor --json\n  stockroom config\n  stockroom seed --force"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and catalog storage readiness checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Write a deterministic demo catalog through the storage adapter")]
    Seed {
        #[arg(long, help = "Replace a catalog that already holds products")]
        force: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Seed { force } => commands::seed::run(force),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
