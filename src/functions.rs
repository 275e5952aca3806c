#![forbid(unsafe_code)]

//! Function registry
//!
//! Some directives name a function instead of carrying data: the comparator
//! of `unique`, the method of `external`, the adjuster of `fork`, and the
//! `adjust` modifier of references. The registry maps those names to
//! callables supplied by the caller, so descriptions never carry executable
//! code.

use crate::error::{CompileError, ConfigError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Two-argument predicate deciding whether two values are duplicates
pub type Comparator = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// One-argument value transform
pub type Transform = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// A registered callable
#[derive(Clone)]
pub enum Function {
    Comparator(Comparator),
    Transform(Transform),
}

impl Function {
    /// Kind name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Function::Comparator(_) => "comparator",
            Function::Transform(_) => "transform",
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function::{}(..)", self.kind())
    }
}

/// A resolved function together with the name it was registered under
#[derive(Debug, Clone)]
pub struct NamedFunction {
    name: String,
    function: Function,
}

impl NamedFunction {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    /// Calls the function as a comparator
    ///
    /// Returns `None` if it is a transform.
    pub fn compare(&self, a: &Value, b: &Value) -> Option<bool> {
        match &self.function {
            Function::Comparator(f) => Some(f(a, b)),
            Function::Transform(_) => None,
        }
    }

    /// Calls the function as a transform
    ///
    /// Returns `None` if it is a comparator.
    pub fn transform(&self, value: &Value) -> Option<Value> {
        match &self.function {
            Function::Transform(f) => Some(f(value)),
            Function::Comparator(_) => None,
        }
    }
}

impl PartialEq for NamedFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.function.kind() == other.function.kind()
    }
}

/// Functions shipped with the crate, addressable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuiltinFunction {
    DeepEqual,
    CaseInsensitive,
    Identity,
    Trim,
    Lowercase,
    Uppercase,
}

impl BuiltinFunction {
    /// Returns all builtins
    pub fn all() -> [BuiltinFunction; 6] {
        [
            BuiltinFunction::DeepEqual,
            BuiltinFunction::CaseInsensitive,
            BuiltinFunction::Identity,
            BuiltinFunction::Trim,
            BuiltinFunction::Lowercase,
            BuiltinFunction::Uppercase,
        ]
    }

    /// Name the builtin is registered under
    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinFunction::DeepEqual => "deep-equal",
            BuiltinFunction::CaseInsensitive => "case-insensitive",
            BuiltinFunction::Identity => "identity",
            BuiltinFunction::Trim => "trim",
            BuiltinFunction::Lowercase => "lowercase",
            BuiltinFunction::Uppercase => "uppercase",
        }
    }

    /// Builds the callable
    pub fn function(&self) -> Function {
        match self {
            BuiltinFunction::DeepEqual => Function::Comparator(Arc::new(|a, b| a == b)),
            BuiltinFunction::CaseInsensitive => {
                Function::Comparator(Arc::new(|a, b| match (a, b) {
                    (Value::String(a), Value::String(b)) => a.to_lowercase() == b.to_lowercase(),
                    _ => a == b,
                }))
            }
            BuiltinFunction::Identity => Function::Transform(Arc::new(|v| v.clone())),
            BuiltinFunction::Trim => Function::Transform(Arc::new(|v| map_string(v, |s| s.trim().to_string()))),
            BuiltinFunction::Lowercase => Function::Transform(Arc::new(|v| map_string(v, str::to_lowercase))),
            BuiltinFunction::Uppercase => Function::Transform(Arc::new(|v| map_string(v, str::to_uppercase))),
        }
    }
}

fn map_string(value: &Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(s)),
        other => other.clone(),
    }
}

/// Comparator treating two objects as duplicates when one key holds equal values
pub fn field_equals(field: impl Into<String>) -> Function {
    let field = field.into();
    Function::Comparator(Arc::new(move |a, b| match (a.get(&field), b.get(&field)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }))
}

/// A function entry in the `[functions]` configuration table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FunctionSpec {
    /// Alias of a builtin
    Builtin(BuiltinFunction),
    /// Comparator over one object key
    FieldEquals {
        #[serde(rename = "field-equals")]
        field_equals: String,
    },
}

impl FunctionSpec {
    pub fn function(&self) -> Function {
        match self {
            FunctionSpec::Builtin(builtin) => builtin.function(),
            FunctionSpec::FieldEquals { field_equals: field } => field_equals(field.clone()),
        }
    }
}

/// Registry of named functions available to `compile`
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Function>,
}

impl FunctionRegistry {
    /// Create a new empty FunctionRegistry
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Create a registry holding every builtin function
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for builtin in BuiltinFunction::all() {
            registry.register(builtin.as_str(), builtin.function());
        }
        registry
    }

    /// Build a registry from builtins plus the configured aliases
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if an alias name is empty.
    pub fn from_specs<'a, I>(specs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a String, &'a FunctionSpec)>,
    {
        let mut registry = Self::with_builtins();
        for (name, spec) in specs {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "function names must not be empty".to_string(),
                ));
            }
            if registry.register(name.clone(), spec.function()).is_some() {
                tracing::debug!(function = %name, "configured function overrides a builtin");
            }
        }
        Ok(registry)
    }

    /// Register a function, returning the one it replaced
    pub fn register(&mut self, name: impl Into<String>, function: Function) -> Option<Function> {
        self.functions.insert(name.into(), function)
    }

    /// Register a comparator
    pub fn register_comparator<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.register(name, Function::Comparator(Arc::new(f)));
        self
    }

    /// Register a transform
    pub fn register_transform<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.register(name, Function::Transform(Arc::new(f)));
        self
    }

    /// Get a function by name
    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Resolve a comparator by name
    ///
    /// # Errors
    ///
    /// Returns `CompileError::UnknownFunction` if the name is not registered
    /// and `CompileError::FunctionKind` if it names a transform.
    pub fn comparator(&self, name: &str) -> Result<NamedFunction, CompileError> {
        self.resolve(name, "comparator")
    }

    /// Resolve a transform by name
    ///
    /// # Errors
    ///
    /// Returns `CompileError::UnknownFunction` if the name is not registered
    /// and `CompileError::FunctionKind` if it names a comparator.
    pub fn transform(&self, name: &str) -> Result<NamedFunction, CompileError> {
        self.resolve(name, "transform")
    }

    fn resolve(&self, name: &str, expected: &'static str) -> Result<NamedFunction, CompileError> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| CompileError::UnknownFunction(name.to_string()))?;

        if function.kind() != expected {
            return Err(CompileError::FunctionKind {
                name: name.to_string(),
                expected,
            });
        }

        Ok(NamedFunction {
            name: name.to_string(),
            function: function.clone(),
        })
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
