//! Common helper functions shared across CLI commands
//!
//! This module provides shared functionality for loading configuration,
//! discovering description files, and resolving color settings.

use crate::batch::{FileWalker, FileWalkerError};
use crate::cli::args::ColorChoice;
use crate::config::{CONFIG_FILE, ColorOption, Config};
use crate::error::ConfigError;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURES: i32 = 1;
pub const EXIT_ERROR: i32 = 2;
pub const EXIT_PARSE_ERROR: i32 = 3;

/// Load schemabridge.toml configuration
///
/// An explicit `path` must exist. Without one, `./schemabridge.toml` is used
/// when present and defaults otherwise.
///
/// # Errors
///
/// Returns `ConfigError::Io` if an explicit file does not exist or cannot be
/// read, `ConfigError::Parse` if the TOML is invalid.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                )));
            }
            Config::load(path)
        }
        None => Config::load_or_default(CONFIG_FILE),
    }
}

/// Discover description files using FileWalker
///
/// # Arguments
///
/// * `paths` - Paths to walk (directories or files)
/// * `config` - Configuration containing include/exclude patterns
///
/// # Errors
///
/// Returns `FileWalkerError` if there is an error walking the file system.
pub(crate) fn discover_files(
    paths: &[String],
    config: &Config,
) -> Result<Vec<PathBuf>, FileWalkerError> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }

    let roots: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
    let walker = FileWalker::new(&roots, &config.bridge.include, &config.bridge.exclude)?;
    walker.walk().collect()
}

/// Resolve the effective color choice
///
/// An explicit `--color always|never` wins; `auto` defers to the configured
/// setting, and then to whether stdout is a terminal.
pub(crate) fn color_choice(flag: ColorChoice, configured: ColorOption) -> termcolor::ColorChoice {
    let effective = match flag {
        ColorChoice::Always => ColorOption::Always,
        ColorChoice::Never => ColorOption::Never,
        ColorChoice::Auto => configured,
    };

    match effective {
        ColorOption::Always => termcolor::ColorChoice::Always,
        ColorOption::Never => termcolor::ColorChoice::Never,
        ColorOption::Auto if std::io::stdout().is_terminal() => termcolor::ColorChoice::Auto,
        ColorOption::Auto => termcolor::ColorChoice::Never,
    }
}
