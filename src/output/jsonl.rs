#![forbid(unsafe_code)]

//! JSONL output formatter for machine-readable output
//!
//! Outputs one JSON object per line in a deterministic order:
//! 1. One file record per description file (sorted by path)
//! 2. One status record

use crate::batch::{BatchResult, FileOutcome};
use crate::error::BridgeError;
use serde::Serialize;
use std::path::PathBuf;

/// JSONL output formatter
///
/// Formats batch results as JSON Lines (one JSON object per line).
pub struct JsonlFormatter;

impl JsonlFormatter {
    /// Creates a new JsonlFormatter
    pub fn new() -> Self {
        JsonlFormatter
    }

    /// Format the batch result as JSONL
    pub fn format(&self, result: &BatchResult) -> String {
        let mut output = String::new();

        let mut records: Vec<FileRecord> = result.outcomes.iter().map(FileRecord::from).collect();
        records.sort_by(|a, b| a.file.cmp(&b.file));

        for record in records {
            if let Ok(json) = serde_json::to_string(&record) {
                output.push_str(&json);
                output.push('\n');
            }
        }

        let failed = result.failures() as u64;
        let status = StatusRecord {
            record_type: "status",
            passed: failed == 0,
            files_checked: result.files_checked() as u64,
            files_failed: failed,
        };

        if let Ok(json) = serde_json::to_string(&status) {
            output.push_str(&json);
            output.push('\n');
        }

        output
    }
}

impl Default for JsonlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Short machine-readable name of a failure
pub(crate) fn error_kind(error: &BridgeError) -> &'static str {
    match error {
        BridgeError::Config(_) => "config",
        BridgeError::Compile(_) => "compile",
        BridgeError::Parse { .. } => "parse",
        BridgeError::Io(_) => "io",
    }
}

/// File record for JSONL output
#[derive(Debug, Serialize)]
struct FileRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    file: PathBuf,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    directives: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recovered: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl From<&FileOutcome> for FileRecord {
    fn from(outcome: &FileOutcome) -> Self {
        let base = FileRecord {
            record_type: "file",
            file: outcome.path.clone(),
            status: "ok",
            directives: None,
            recovered: None,
            error: None,
            message: None,
        };
        match &outcome.result {
            Ok(compiled) => FileRecord {
                directives: Some(compiled.directives as u64),
                recovered: Some(compiled.recovered as u64),
                ..base
            },
            Err(e) => FileRecord {
                status: "error",
                error: Some(error_kind(e)),
                message: Some(e.to_string()),
                ..base
            },
        }
    }
}

/// Status record for JSONL output
#[derive(Debug, Serialize)]
struct StatusRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    passed: bool,
    files_checked: u64,
    files_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::CompiledFile;
    use crate::error::CompileError;
    use serde_json::Value;

    fn sample() -> BatchResult {
        BatchResult {
            outcomes: vec![
                FileOutcome {
                    path: PathBuf::from("b.json"),
                    result: Err(BridgeError::Compile(CompileError::UnknownDirective(
                        "bogus".to_string(),
                    ))),
                },
                FileOutcome {
                    path: PathBuf::from("a.json"),
                    result: Ok(CompiledFile {
                        directives: 3,
                        recovered: 2,
                    }),
                },
            ],
        }
    }

    #[test]
    fn test_format_records_sorted_by_file() {
        let output = JsonlFormatter::new().format(&sample());
        let lines: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["file"], "a.json");
        assert_eq!(lines[0]["status"], "ok");
        assert_eq!(lines[0]["directives"], 3);
        assert!(lines[0].get("message").is_none());

        assert_eq!(lines[1]["file"], "b.json");
        assert_eq!(lines[1]["status"], "error");
        assert_eq!(lines[1]["error"], "compile");
        assert!(lines[1]["message"].as_str().unwrap().contains("bogus"));

        assert_eq!(lines[2]["type"], "status");
        assert_eq!(lines[2]["passed"], false);
        assert_eq!(lines[2]["files_checked"], 2);
        assert_eq!(lines[2]["files_failed"], 1);
    }

    #[test]
    fn test_empty_result() {
        let output = JsonlFormatter::new().format(&BatchResult { outcomes: vec![] });
        assert_eq!(
            output.trim(),
            r#"{"type":"status","passed":true,"files_checked":0,"files_failed":0}"#
        );
    }
}
