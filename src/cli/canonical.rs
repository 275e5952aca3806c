//! Canonical command implementation
//!
//! `schemabridge canonical FILE` compiles a description against the in-memory
//! engine and prints what extraction recovers from the validator: the
//! canonical form of the description.

use crate::batch::read_description;
use crate::cli::common::{EXIT_ERROR, EXIT_FAILURES, EXIT_PARSE_ERROR, EXIT_SUCCESS};
use crate::compiler::compile;
use crate::engine::memory::MemoryEngine;
use crate::error::{BridgeError, ConfigError};
use crate::extractor::extract;
use crate::types::SchemaDescription;
use std::fs;
use std::path::Path;

/// Run the canonical command
///
/// # Arguments
///
/// * `file` - Description file to canonicalize
/// * `output` - Destination file; stdout when `None`
/// * `compact` - Emit single-line JSON instead of pretty-printed
/// * `config_path` - Explicit configuration file, if any
///
/// # Returns
///
/// Exit code:
/// - 0: Success
/// - 1: The description does not compile
/// - 2: Error (configuration/I/O error)
/// - 3: Parse error (invalid JSON description or TOML configuration)
pub fn run_canonical(
    file: &Path,
    output: Option<&Path>,
    compact: bool,
    config_path: Option<&Path>,
) -> i32 {
    match run_canonical_inner(file, output, compact, config_path) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            match e {
                BridgeError::Parse { .. } => EXIT_PARSE_ERROR,
                BridgeError::Config(ConfigError::Parse(_)) => EXIT_PARSE_ERROR,
                BridgeError::Compile(_) => EXIT_FAILURES,
                _ => EXIT_ERROR,
            }
        }
    }
}

fn run_canonical_inner(
    file: &Path,
    output: Option<&Path>,
    compact: bool,
    config_path: Option<&Path>,
) -> Result<(), BridgeError> {
    let config = super::common::load_config(config_path)?;
    let functions = config.function_registry()?;

    let description = read_description(file)?;
    let canonical = canonicalize(&description, &functions)?;
    let rendered = render(&canonical, compact);

    match output {
        Some(path) => fs::write(path, rendered)?,
        None => print!("{}", rendered),
    }
    Ok(())
}

/// Round-trip a description through the in-memory engine
pub(crate) fn canonicalize(
    description: &SchemaDescription,
    functions: &crate::functions::FunctionRegistry,
) -> Result<SchemaDescription, BridgeError> {
    let validator = compile(&MemoryEngine::new(), description, functions)?;
    Ok(extract(&validator))
}

fn render(description: &SchemaDescription, compact: bool) -> String {
    let value = description.to_value();
    let mut rendered = if compact {
        value.to_string()
    } else {
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    };
    rendered.push('\n');
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::FunctionRegistry;
    use crate::types::SchemaType;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_canonicalize_sorts_pattern_flags() {
        let description = SchemaDescription::new(SchemaType::String).with_directive("pattern", "/^a/mi");
        let canonical = canonicalize(&description, &FunctionRegistry::with_builtins()).unwrap();
        assert_eq!(canonical.directive("pattern"), Some(&json!("/^a/im")));
    }

    #[test]
    fn test_render_compact_is_single_line() {
        let description = SchemaDescription::new(SchemaType::Number).with_directive("min", 1);
        let rendered = render(&description, true);
        assert_eq!(rendered, "{\"type\":\"number\",\"min\":1}\n");
    }

    #[test]
    fn test_run_canonical_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        let config = dir.path().join("schemabridge.toml");
        fs::write(&config, "[bridge]\nversion = \"1\"\n").unwrap();
        fs::write(&input, r#"{"type": "string", "required": true, "max": 8}"#).unwrap();

        let code = run_canonical(&input, Some(&output), true, Some(&config));
        assert_eq!(code, EXIT_SUCCESS);

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written, json!({"type": "string", "required": true, "max": 8}));
    }

    #[test]
    fn test_run_canonical_exit_codes() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("schemabridge.toml");
        fs::write(&config, "[bridge]\nversion = \"1\"\n").unwrap();

        let malformed = dir.path().join("malformed.json");
        fs::write(&malformed, "{not json").unwrap();
        assert_eq!(
            run_canonical(&malformed, None, false, Some(&config)),
            EXIT_PARSE_ERROR
        );

        let unknown = dir.path().join("unknown.json");
        fs::write(&unknown, r#"{"type": "any", "bogus": true}"#).unwrap();
        assert_eq!(run_canonical(&unknown, None, false, Some(&config)), EXIT_FAILURES);

        let missing = dir.path().join("missing.json");
        assert_eq!(run_canonical(&missing, None, false, Some(&config)), EXIT_ERROR);
    }
}
