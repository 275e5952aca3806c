#![forbid(unsafe_code)]

//! Parallel compilation of description files
//!
//! This module provides the BatchCompiler which reads, parses and compiles
//! each discovered description file independently, in parallel using rayon.

use crate::compiler::compile;
use crate::engine::{Engine, Introspect};
use crate::error::BridgeError;
use crate::extractor::extract;
use crate::functions::FunctionRegistry;
use crate::types::SchemaDescription;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of compiling one description file
#[derive(Debug)]
pub struct FileOutcome {
    /// Path of the description file
    pub path: PathBuf,
    /// Compilation summary, or the error that stopped it
    pub result: Result<CompiledFile, BridgeError>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Summary of a successfully compiled description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompiledFile {
    /// Directives in the description, counted through every nested property
    pub directives: usize,
    /// Directives recovered by extracting the compiled validator
    pub recovered: usize,
}

/// Result of compiling all files
#[derive(Debug)]
pub struct BatchResult {
    /// One outcome per file, in input order
    pub outcomes: Vec<FileOutcome>,
}

impl BatchResult {
    /// Number of files that failed to read, parse or compile
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_ok()).count()
    }

    pub fn files_checked(&self) -> usize {
        self.outcomes.len()
    }
}

/// Compiles description files against one engine and function registry
///
/// The compiler:
/// - Parses each file with JSON-path error context
/// - Compiles files in parallel, one independent compilation per file
/// - Extracts each compiled validator to measure what survives the round trip
pub struct BatchCompiler<E> {
    engine: E,
    functions: Arc<FunctionRegistry>,
}

impl<E> BatchCompiler<E>
where
    E: Engine + Sync,
    E::Schema: Introspect,
{
    /// Creates a new BatchCompiler
    ///
    /// # Arguments
    ///
    /// * `engine` - Engine building the validators
    /// * `functions` - Registry resolving function names in descriptions
    pub fn new(engine: E, functions: FunctionRegistry) -> Self {
        Self {
            engine,
            functions: Arc::new(functions),
        }
    }

    /// Compile every file
    ///
    /// Failures are recorded per file; one bad file never stops the others.
    pub fn compile_files(&self, files: &[PathBuf]) -> BatchResult {
        let outcomes = files
            .par_iter()
            .map(|path| FileOutcome {
                path: path.clone(),
                result: self.compile_file(path),
            })
            .collect();

        BatchResult { outcomes }
    }

    fn compile_file(&self, path: &Path) -> Result<CompiledFile, BridgeError> {
        let description = read_description(path)?;
        let validator = compile(&self.engine, &description, &self.functions)?;
        let recovered = extract(&validator);

        tracing::debug!(path = %path.display(), "compiled description file");
        Ok(CompiledFile {
            directives: count_directives(&description),
            recovered: count_directives(&recovered),
        })
    }
}

/// Read and parse a description file
///
/// # Errors
///
/// Returns `BridgeError::Io` if the file cannot be read and
/// `BridgeError::Parse` with the failing JSON path if it is not a valid
/// description.
pub fn read_description(path: &Path) -> Result<SchemaDescription, BridgeError> {
    let content = fs::read_to_string(path)?;
    parse_description(path, &content)
}

/// Parse a description with JSON-path context in error messages
pub fn parse_description(path: &Path, content: &str) -> Result<SchemaDescription, BridgeError> {
    let de = &mut serde_json::Deserializer::from_str(content);
    serde_path_to_error::deserialize::<_, SchemaDescription>(de).map_err(|err| {
        let json_path = err.path().to_string();
        BridgeError::Parse {
            file: path.to_path_buf(),
            message: format!("at JSON path {json_path}: {}", err.into_inner()),
        }
    })
}

/// Count directives through every nested property
pub fn count_directives(description: &SchemaDescription) -> usize {
    description.directives.len()
        + description
            .properties
            .iter()
            .flat_map(|properties| properties.values())
            .map(count_directives)
            .sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::MemoryEngine;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_compile_files_mixed_outcomes() {
        let dir = TempDir::new().unwrap();
        let good = write(
            &dir,
            "good.json",
            r#"{"type": "object", "properties": {"age": {"type": "number", "min": 0, "required": true}}}"#,
        );
        let unknown = write(&dir, "unknown.json", r#"{"type": "string", "bogus": true}"#);
        let broken = write(&dir, "broken.json", "{ not json");

        let batch = BatchCompiler::new(MemoryEngine, FunctionRegistry::with_builtins());
        let result = batch.compile_files(&[good.clone(), unknown, broken]);

        assert_eq!(result.files_checked(), 3);
        assert_eq!(result.failures(), 2);
        assert_eq!(result.outcomes[0].path, good);
        let compiled = result.outcomes[0].result.as_ref().unwrap();
        assert_eq!(compiled.directives, 2);
        assert_eq!(compiled.recovered, 2);
        assert!(matches!(
            result.outcomes[1].result,
            Err(BridgeError::Compile(_))
        ));
        assert!(matches!(
            result.outcomes[2].result,
            Err(BridgeError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_error_has_json_path() {
        let err = parse_description(
            Path::new("x.json"),
            r#"{"type": "object", "properties": {"a": {"type": "tuple"}}}"#,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("x.json"));
        assert!(message.contains("properties.a"), "{message}");
    }

    #[test]
    fn test_missing_file() {
        let err = read_description(Path::new("/nonexistent/description.json")).unwrap_err();
        assert!(matches!(err, BridgeError::Io(_)));
    }

    #[test]
    fn test_count_directives() {
        let description = SchemaDescription::new(crate::types::SchemaType::Object)
            .with_directive("unknown", true)
            .with_property(
                "a",
                SchemaDescription::new(crate::types::SchemaType::String).with_directive("trim", true),
            );
        assert_eq!(count_directives(&description), 2);
    }
}
