#![forbid(unsafe_code)]

//! Human-readable output formatter
//!
//! One line per description file, followed by a summary. Status markers are
//! colored when the output stream supports it.

use crate::batch::BatchResult;
use std::io;
use termcolor::{Buffer, Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Human-readable formatter for batch results
pub struct HumanFormatter {
    color: ColorChoice,
}

impl HumanFormatter {
    /// Create a new human formatter
    pub fn new(color: ColorChoice) -> Self {
        Self { color }
    }

    /// Write the report to any color-capable writer
    pub fn write_to<W: WriteColor>(&self, result: &BatchResult, out: &mut W) -> io::Result<()> {
        let mut outcomes: Vec<_> = result.outcomes.iter().collect();
        outcomes.sort_by(|a, b| a.path.cmp(&b.path));

        for outcome in outcomes {
            match &outcome.result {
                Ok(compiled) => {
                    write_marker(out, "✓", Color::Green)?;
                    writeln!(
                        out,
                        " {} ({} directives, {} recovered)",
                        outcome.path.display(),
                        compiled.directives,
                        compiled.recovered
                    )?;
                }
                Err(e) => {
                    write_marker(out, "✗", Color::Red)?;
                    writeln!(out, " {}", outcome.path.display())?;
                    writeln!(out, "    {}", e)?;
                }
            }
        }

        let failed = result.failures();
        writeln!(out)?;
        if failed == 0 {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
            write!(out, "Check PASSED")?;
        } else {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            write!(out, "Check FAILED")?;
        }
        out.reset()?;
        writeln!(
            out,
            ": {} file(s) checked, {} failed",
            result.files_checked(),
            failed
        )
    }

    /// Format the report without color
    pub fn format(&self, result: &BatchResult) -> String {
        let mut buffer = Buffer::no_color();
        // Writing into an in-memory buffer does not fail
        let _ = self.write_to(result, &mut buffer);
        String::from_utf8_lossy(buffer.as_slice()).into_owned()
    }

    /// Write the report to stdout honoring the color choice
    pub fn write_to_stdout(&self, result: &BatchResult) -> io::Result<()> {
        let mut stdout = StandardStream::stdout(self.color);
        self.write_to(result, &mut stdout)
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new(ColorChoice::Auto)
    }
}

fn write_marker<W: WriteColor>(out: &mut W, marker: &str, color: Color) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    write!(out, "{}", marker)?;
    out.reset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{CompiledFile, FileOutcome};
    use crate::error::{BridgeError, CompileError};
    use std::path::PathBuf;

    #[test]
    fn test_format_pass() {
        let result = BatchResult {
            outcomes: vec![FileOutcome {
                path: PathBuf::from("user.json"),
                result: Ok(CompiledFile {
                    directives: 4,
                    recovered: 4,
                }),
            }],
        };

        let output = HumanFormatter::default().format(&result);
        assert!(output.contains("✓ user.json (4 directives, 4 recovered)"));
        assert!(output.contains("Check PASSED: 1 file(s) checked, 0 failed"));
    }

    #[test]
    fn test_format_failure() {
        let result = BatchResult {
            outcomes: vec![FileOutcome {
                path: PathBuf::from("bad.json"),
                result: Err(BridgeError::Compile(CompileError::UnknownDirective(
                    "bogus".to_string(),
                ))),
            }],
        };

        let output = HumanFormatter::new(ColorChoice::Never).format(&result);
        assert!(output.contains("✗ bad.json"));
        assert!(output.contains("Unknown directive: bogus"));
        assert!(output.contains("Check FAILED: 1 file(s) checked, 1 failed"));
    }
}
