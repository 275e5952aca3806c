#![forbid(unsafe_code)]

//! Directive table formatters
//!
//! This module provides formatters for the grammar table shown by the
//! `schemabridge directives` command. It supports both human-readable and
//! JSONL output formats.

use crate::grammar::Directive;
use serde::Serialize;

/// Display information for one directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveInfo {
    pub name: &'static str,
    pub category: &'static str,
    pub shape: &'static str,
    pub reversible: bool,
}

impl From<&Directive> for DirectiveInfo {
    fn from(directive: &Directive) -> Self {
        Self {
            name: directive.name,
            category: directive.category.as_str(),
            shape: directive.category.shape(),
            reversible: directive.reversible,
        }
    }
}

/// Human-readable formatter for the directive table
pub struct DirectiveListHumanFormatter;

impl DirectiveListHumanFormatter {
    /// Create a new human formatter
    pub fn new() -> Self {
        DirectiveListHumanFormatter
    }

    /// Format the directives grouped by category, in table order
    pub fn format(&self, directives: &[DirectiveInfo]) -> String {
        let mut output = String::new();
        output.push_str(&format!("Directives ({}):\n", directives.len()));

        let mut current = None;
        for directive in directives {
            if current != Some(directive.category) {
                current = Some(directive.category);
                output.push('\n');
                output.push_str(&format!("{}:\n", directive.category));
            }
            let marker = if directive.reversible { "" } else { " [write-only]" };
            output.push_str(&format!(
                "  {:<14} {}{}\n",
                directive.name, directive.shape, marker
            ));
        }

        output
    }
}

impl Default for DirectiveListHumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// JSONL output structure for one directive
#[derive(Debug, Serialize)]
struct JsonlDirective<'a> {
    name: &'a str,
    category: &'a str,
    shape: &'a str,
    reversible: bool,
}

/// JSONL formatter for the directive table
pub struct DirectiveListJsonlFormatter;

impl DirectiveListJsonlFormatter {
    /// Create a new JSONL formatter
    pub fn new() -> Self {
        DirectiveListJsonlFormatter
    }

    /// Format the directives as JSONL, one object per directive
    pub fn format(&self, directives: &[DirectiveInfo]) -> String {
        let mut output = String::new();

        for directive in directives {
            let record = JsonlDirective {
                name: directive.name,
                category: directive.category,
                shape: directive.shape,
                reversible: directive.reversible,
            };
            if let Ok(json) = serde_json::to_string(&record) {
                output.push_str(&json);
                output.push('\n');
            }
        }

        output
    }
}

impl Default for DirectiveListJsonlFormatter {
    fn default() -> Self {
        Self::new()
    }
}
