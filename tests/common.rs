//! Test utilities for schemabridge integration tests

#![allow(dead_code)]

use schemabridge::engine::memory::{MemoryEngine, MemorySchema};
use schemabridge::{CompileError, FunctionRegistry, SchemaDescription, compile, extract};
use serde_json::Value;

/// Result type alias for tests
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Extract Ok value or panic with context
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("assertion failed: expected Ok, got Err({:?})", e),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Extract Some value or panic with context
#[macro_export]
macro_rules! assert_some {
    ($expr:expr) => {
        match $expr {
            Some(v) => v,
            None => panic!("assertion failed: expected Some, got None"),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Some(v) => v,
            None => panic!("{}: got None", $msg),
        }
    };
}

/// Parse a description from a JSON value, panicking on malformed input
pub fn description(value: Value) -> SchemaDescription {
    match SchemaDescription::from_value(value) {
        Ok(description) => description,
        Err(e) => panic!("invalid test description: {e}"),
    }
}

/// Compile against the in-memory engine with the builtin functions
pub fn compile_memory(value: Value) -> Result<MemorySchema, CompileError> {
    compile(
        &MemoryEngine::new(),
        &description(value),
        &FunctionRegistry::with_builtins(),
    )
}

/// `extract(compile(d))` rendered as JSON
pub fn round_trip(value: Value) -> Value {
    let validator = assert_ok!(compile_memory(value), "description should compile");
    extract(&validator).to_value()
}
