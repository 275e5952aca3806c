//! CLI argument parsing using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for schemabridge commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON Lines format (one JSON object per line)
    Jsonl,
}

impl From<crate::config::OutputFormat> for OutputFormat {
    fn from(format: crate::config::OutputFormat) -> Self {
        match format {
            crate::config::OutputFormat::Human => OutputFormat::Human,
            crate::config::OutputFormat::Jsonl => OutputFormat::Jsonl,
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Automatically detect if terminal supports color
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

/// schemabridge CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "schemabridge")]
#[command(about = "Translate between validation rule descriptions and live validators")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Output coloring
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Configuration file (defaults to ./schemabridge.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available schemabridge subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default schemabridge.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Compile every description file and report per-file status
    Check {
        /// Paths to check (defaults to current directory)
        #[arg(default_value = ".")]
        paths: Vec<String>,

        /// Output format (defaults to the configured format)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Print the canonical form of a description file
    Canonical {
        /// Description file to canonicalize
        file: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit compact single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// List every directive in the grammar table
    Directives {
        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_default_args() {
        let cli = Cli::parse_from(["schemabridge", "check"]);
        match cli.command {
            Command::Check { paths, format } => {
                assert_eq!(paths, vec!["."]);
                assert_eq!(format, None);
            }
            _ => panic!("Expected Check command"),
        }
        assert_eq!(cli.color, ColorChoice::Auto);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_check_with_paths_and_format() {
        let cli = Cli::parse_from(["schemabridge", "check", "schemas/", "more/", "-f", "jsonl"]);
        match cli.command {
            Command::Check { paths, format } => {
                assert_eq!(paths, vec!["schemas/", "more/"]);
                assert_eq!(format, Some(OutputFormat::Jsonl));
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_init_with_force() {
        let cli = Cli::parse_from(["schemabridge", "init", "--force"]);
        match cli.command {
            Command::Init { force } => assert!(force),
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_canonical_args() {
        let cli = Cli::parse_from([
            "schemabridge",
            "canonical",
            "user.json",
            "-o",
            "out.json",
            "--compact",
        ]);
        match cli.command {
            Command::Canonical {
                file,
                output,
                compact,
            } => {
                assert_eq!(file, PathBuf::from("user.json"));
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert!(compact);
            }
            _ => panic!("Expected Canonical command"),
        }
    }

    #[test]
    fn test_canonical_requires_file() {
        let result = Cli::try_parse_from(["schemabridge", "canonical"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_directives_default() {
        let cli = Cli::parse_from(["schemabridge", "directives"]);
        match cli.command {
            Command::Directives { format } => assert_eq!(format, OutputFormat::Human),
            _ => panic!("Expected Directives command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "schemabridge",
            "directives",
            "--color",
            "never",
            "--config",
            "custom.toml",
        ]);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_config_format_conversion() {
        assert_eq!(
            OutputFormat::from(crate::config::OutputFormat::Jsonl),
            OutputFormat::Jsonl
        );
    }

    #[test]
    fn test_invalid_format() {
        let result = Cli::try_parse_from(["schemabridge", "check", "--format", "invalid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_color() {
        let result = Cli::try_parse_from(["schemabridge", "--color", "invalid", "check"]);
        assert!(result.is_err());
    }
}
