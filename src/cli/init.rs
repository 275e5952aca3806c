//! Initialize a schemabridge project
//!
//! Writes a commented default schemabridge.toml.

use crate::config::CONFIG_FILE;
use std::fs;
use std::path::Path;

/// Default content for schemabridge.toml
const DEFAULT_CONFIG_TOML: &str = r#"[bridge]
version = "1"

# Description files to include
include = ["**/*.json"]

# Description files to exclude
# exclude = ["**/target/**", "**/node_modules/**"]

[output]
format = "human"
# color = "auto"

[functions]
# Alias a builtin comparator or transform:
# caseless = "case-insensitive"
# Compare objects by one key:
# same-id = { field-equals = "id" }
"#;

/// Error type for init command
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Path error
    #[error("Path error: {0}")]
    Path(String),
}

/// Result of init command
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InitResult {
    /// Files that were created
    pub created: Vec<String>,
    /// Files that were skipped (already existed)
    pub skipped: Vec<String>,
    /// Files that were overwritten
    pub overwritten: Vec<String>,
}

/// Run the init command in the current directory
///
/// # Arguments
/// * `force` - If true, overwrite an existing file. If false, skip it.
pub fn run_init(force: bool) -> Result<InitResult, InitError> {
    run_init_in(Path::new("."), force)
}

/// Run the init command in `dir`
///
/// # Returns
/// * `Ok(InitResult)` - Summary of created/skipped/overwritten files
/// * `Err(InitError)` - If `dir` is not a directory or an I/O error occurred
pub fn run_init_in(dir: &Path, force: bool) -> Result<InitResult, InitError> {
    if !dir.is_dir() {
        return Err(InitError::Path(format!(
            "Path '{}' is not a directory",
            dir.display()
        )));
    }

    let mut result = InitResult::default();
    handle_file(&dir.join(CONFIG_FILE), DEFAULT_CONFIG_TOML, force, &mut result)?;
    Ok(result)
}

/// Handle creation of a single file
fn handle_file(
    path: &Path,
    content: &str,
    force: bool,
    result: &mut InitResult,
) -> Result<(), InitError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| InitError::Path(format!("Invalid file name: {:?}", path)))?;

    if path.exists() {
        if force {
            fs::write(path, content)?;
            result.overwritten.push(name);
        } else {
            result.skipped.push(name);
        }
    } else {
        fs::write(path, content)?;
        result.created.push(name);
    }

    Ok(())
}
