//! CLI argument parsing and command dispatch

pub mod args;
pub mod canonical;
pub mod check;
pub(crate) mod common;
pub mod directives;
pub mod init;

// Re-export types for convenient access
pub use args::{Cli, ColorChoice, Command, OutputFormat};
