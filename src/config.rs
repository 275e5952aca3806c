//! Configuration file parsing and validation

pub mod bridge_toml;

pub use bridge_toml::{BridgeMeta, CONFIG_FILE, ColorOption, Config, OutputConfig, OutputFormat};
