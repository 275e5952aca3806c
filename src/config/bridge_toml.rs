//! Parsing and validation for schemabridge.toml configuration files

use crate::error::ConfigError;
use crate::functions::{FunctionRegistry, FunctionSpec};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE: &str = "schemabridge.toml";

/// Main configuration struct for schemabridge.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Bridge metadata and file selection
    pub bridge: BridgeMeta,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Named functions available to descriptions
    #[serde(default)]
    pub functions: IndexMap<String, FunctionSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bridge: BridgeMeta {
                version: "1".to_string(),
                include: default_include(),
                exclude: Vec::new(),
            },
            output: OutputConfig::default(),
            functions: IndexMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load configuration from `path` if it exists, otherwise use defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no configuration file; using defaults");
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Build the function registry: builtins plus the `[functions]` table
    pub fn function_registry(&self) -> Result<FunctionRegistry, ConfigError> {
        FunctionRegistry::from_specs(&self.functions)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.bridge.version != "1" {
            return Err(ConfigError::Validation(format!(
                "Unsupported configuration version '{}'. Expected '1'",
                self.bridge.version
            )));
        }

        for (kind, patterns) in [("include", &self.bridge.include), ("exclude", &self.bridge.exclude)] {
            for pattern in patterns {
                globset::Glob::new(pattern).map_err(|e| {
                    ConfigError::Validation(format!(
                        "Invalid {} glob pattern '{}': {}",
                        kind, pattern, e
                    ))
                })?;
            }
        }

        if let Some(name) = self.functions.keys().find(|name| name.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "Invalid function name '{}': names must not be empty",
                name
            )));
        }

        Ok(())
    }
}

/// Bridge metadata section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeMeta {
    /// Configuration version (must be "1")
    pub version: String,

    /// Description files to include
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Description files to exclude
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_include() -> Vec<String> {
    vec!["**/*.json".to_string()]
}

/// Output configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Color output setting
    #[serde(default)]
    pub color: ColorOption,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: ColorOption::Auto,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON Lines format
    Jsonl,
}

/// Color output options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorOption {
    /// Auto-detect based on terminal capabilities
    #[default]
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::BuiltinFunction;

    const VALID_CONFIG: &str = r#"
[bridge]
version = "1"
include = ["schemas/**/*.json"]
exclude = ["**/fixtures/**"]

[output]
format = "jsonl"
color = "never"

[functions]
caseless = "case-insensitive"
same-id = { field-equals = "id" }
"#;

    #[test]
    fn test_valid_config_parsing() {
        let config = Config::parse(VALID_CONFIG).unwrap();

        assert_eq!(config.bridge.version, "1");
        assert_eq!(config.bridge.include, vec!["schemas/**/*.json"]);
        assert_eq!(config.bridge.exclude, vec!["**/fixtures/**"]);
        assert_eq!(config.output.format, OutputFormat::Jsonl);
        assert_eq!(config.output.color, ColorOption::Never);

        assert_eq!(
            config.functions.get("caseless"),
            Some(&FunctionSpec::Builtin(BuiltinFunction::CaseInsensitive))
        );
        assert_eq!(
            config.functions.get("same-id"),
            Some(&FunctionSpec::FieldEquals {
                field_equals: "id".to_string()
            })
        );
    }

    #[test]
    fn test_minimal_config() {
        let config = Config::parse("[bridge]\nversion = \"1\"\n").unwrap();
        assert_eq!(config.bridge.include, vec!["**/*.json"]);
        assert!(config.bridge.exclude.is_empty());
        assert!(config.functions.is_empty());
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_default_matches_minimal() {
        let config = Config::parse("[bridge]\nversion = \"1\"\n").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_version() {
        let result = Config::parse("[bridge]\nversion = \"2\"\n");
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Unsupported configuration version")
        );
    }

    #[test]
    fn test_missing_version() {
        assert!(Config::parse("[bridge]\ninclude = []\n").is_err());
    }

    #[test]
    fn test_invalid_glob_pattern() {
        let result = Config::parse("[bridge]\nversion = \"1\"\nexclude = [\"[invalid\"]\n");
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid exclude glob pattern")
        );
    }

    #[test]
    fn test_unknown_builtin_function() {
        let result = Config::parse("[bridge]\nversion = \"1\"\n[functions]\nx = \"sorcery\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_empty_function_name() {
        let result = Config::parse("[bridge]\nversion = \"1\"\n[functions]\n\" \" = \"trim\"\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_function_registry_from_config() {
        let config = Config::parse(VALID_CONFIG).unwrap();
        let registry = config.function_registry().unwrap();
        assert!(registry.comparator("caseless").is_ok());
        assert!(registry.comparator("same-id").is_ok());
        assert!(registry.transform("trim").is_ok());
    }

    #[test]
    fn test_config_round_trip() {
        let config = Config::parse(VALID_CONFIG).unwrap();
        let serialized = toml::to_string(&config).unwrap();
        assert_eq!(Config::parse(&serialized).unwrap(), config);
    }
}
