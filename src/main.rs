//! schemabridge CLI entry point

use clap::Parser;
use schemabridge::cli::{Command, args::Cli};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let exit_code = match cli.command {
        Command::Init { force } => match schemabridge::cli::init::run_init(force) {
            Ok(result) => {
                if result.skipped.is_empty() {
                    println!("Created schemabridge.toml.");
                } else {
                    println!("schemabridge.toml already exists. Use --force to overwrite it.");
                }
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                2
            }
        },
        Command::Check { paths, format } => {
            schemabridge::cli::check::run_check(&paths, format, cli.color, config)
        }
        Command::Canonical {
            file,
            output,
            compact,
        } => schemabridge::cli::canonical::run_canonical(&file, output.as_deref(), compact, config),
        Command::Directives { format } => schemabridge::cli::directives::run_directives(format),
    };

    process::exit(exit_code);
}
