//! Check command implementation
//!
//! This module implements the `schemabridge check` command, which:
//! - Loads configuration from schemabridge.toml
//! - Discovers description files
//! - Compiles every file in parallel against the in-memory engine
//! - Formats a per-file report (human or JSONL)
//! - Returns appropriate exit code

use crate::batch::{BatchCompiler, FileWalkerError};
use crate::cli::args::{ColorChoice, OutputFormat};
use crate::cli::common::{EXIT_ERROR, EXIT_FAILURES, EXIT_PARSE_ERROR, EXIT_SUCCESS};
use crate::engine::memory::MemoryEngine;
use crate::error::ConfigError;
use crate::output::{HumanFormatter, JsonlFormatter};
use std::path::Path;

/// Error type specific to check command
#[derive(Debug, thiserror::Error)]
pub(crate) enum CheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("File walker error: {0}")]
    FileWalker(#[from] FileWalkerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the check command
///
/// # Arguments
///
/// * `paths` - Paths to check (defaults to current directory)
/// * `format` - Output format; the configured format when `None`
/// * `color` - Color choice for human output
/// * `config_path` - Explicit configuration file, if any
///
/// # Returns
///
/// Exit code:
/// - 0: Success (every description compiled)
/// - 1: Exceeded (one or more descriptions failed)
/// - 2: Error (configuration/I/O error)
/// - 3: Parse error (invalid TOML configuration)
pub fn run_check(
    paths: &[String],
    format: Option<OutputFormat>,
    color: ColorChoice,
    config_path: Option<&Path>,
) -> i32 {
    match run_check_inner(paths, format, color, config_path) {
        Ok(true) => EXIT_SUCCESS,
        Ok(false) => EXIT_FAILURES,
        Err(e) => {
            eprintln!("Error: {}", e);
            match e {
                CheckError::Config(ConfigError::Parse(_)) => EXIT_PARSE_ERROR,
                _ => EXIT_ERROR,
            }
        }
    }
}

/// Internal implementation of check command
fn run_check_inner(
    paths: &[String],
    format: Option<OutputFormat>,
    color: ColorChoice,
    config_path: Option<&Path>,
) -> Result<bool, CheckError> {
    // 1. Load configuration and build the function registry
    let config = super::common::load_config(config_path)?;
    let functions = config.function_registry()?;
    let format = format.unwrap_or_else(|| config.output.format.into());

    // 2. Discover description files
    let files = super::common::discover_files(paths, &config)?;

    if files.is_empty() {
        eprintln!("Warning: No description files found to check.");
        return Ok(true);
    }

    if format == OutputFormat::Human {
        eprintln!("Checking {} description files...", files.len());
    }

    // 3. Compile in parallel
    let compiler = BatchCompiler::new(MemoryEngine::new(), functions);
    let result = compiler.compile_files(&files);
    tracing::debug!(
        files = result.files_checked(),
        failed = result.failures(),
        "check finished"
    );

    // 4. Format and print output
    match format {
        OutputFormat::Human => {
            let color = super::common::color_choice(color, config.output.color);
            HumanFormatter::new(color).write_to_stdout(&result)?;
        }
        OutputFormat::Jsonl => print!("{}", JsonlFormatter::new().format(&result)),
    }

    Ok(result.failures() == 0)
}
