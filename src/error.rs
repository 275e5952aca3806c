//! Error types for schemabridge
//!
//! This module defines the error types used throughout schemabridge, following
//! a hierarchical structure with specific error variants for different
//! error categories.

use std::path::PathBuf;

/// Errors raised while converting reference and pattern notation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Reference notation could not be parsed
    #[error("Malformed reference: {0}")]
    MalformedReference(String),

    /// Pattern notation could not be parsed or compiled
    #[error("Malformed pattern: {0}")]
    MalformedPattern(String),
}

/// Errors raised by `compile`
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Directive name is not in the grammar table
    #[error("Unknown directive: {0}")]
    UnknownDirective(String),

    /// Reference or pattern notation error
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Function name is not registered
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Function is registered with a different kind than the directive needs
    #[error("Function '{name}' is not a {expected}")]
    FunctionKind { name: String, expected: &'static str },

    /// Directive value does not have the shape its category requires
    #[error("Invalid argument for '{directive}': {message}")]
    InvalidArgument { directive: String, message: String },

    /// A nested description could not be read
    #[error("Invalid nested description: {0}")]
    InvalidDescription(String),

    /// Failure reported by the validation engine, passed through untranslated
    #[error("Engine error: {0}")]
    Engine(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CompileError {
    /// Shorthand for `InvalidArgument`
    pub(crate) fn invalid(directive: &str, message: impl Into<String>) -> Self {
        CompileError::InvalidArgument {
            directive: directive.to_string(),
            message: message.into(),
        }
    }
}

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid TOML syntax or shape
    #[error("Invalid configuration syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed configuration violates a constraint
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Top-level error type for schemabridge
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Compilation error
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// Description file is not valid JSON or not a valid description
    #[error("Parse error in {file}: {message}")]
    Parse { file: PathBuf, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
