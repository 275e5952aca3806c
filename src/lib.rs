#![forbid(unsafe_code)]

//! schemabridge: two-way translation between validation rule descriptions
//! and live validators
//!
//! A description is a plain JSON document naming a type and a list of
//! directives. `compile` drives a validation engine to build the validator a
//! description describes; `extract` reads a built validator back into the
//! canonical description for the reversible part of the grammar.

pub mod batch;
pub mod cli;
pub mod codec;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod functions;
pub mod grammar;
pub mod output;
pub mod types;

// Re-export the two directions of the bridge
pub use compiler::compile;
pub use extractor::extract;

// Re-export error types for convenient access
pub use error::{BridgeError, CodecError, CompileError, ConfigError};

// Re-export core domain types for convenient access
pub use codec::{Operand, Pattern, Reference};
pub use engine::{Argument, Engine, Introspect, Schema};
pub use functions::{BuiltinFunction, Function, FunctionRegistry, NamedFunction};
pub use types::{Operator, Presence, SchemaDescription, SchemaType};
