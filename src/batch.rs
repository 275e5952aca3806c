//! Description file discovery and parallel compilation

pub mod executor;
pub mod file_walker;

pub use executor::{
    BatchCompiler, BatchResult, CompiledFile, FileOutcome, count_directives, parse_description,
    read_description,
};
pub use file_walker::{FileWalker, FileWalkerError, SkipReason, WalkResult};
