//! Directives command implementation
//!
//! Lists every directive in the grammar table with its category, the value
//! shape it accepts, and whether extraction can recover it.

use crate::cli::args::OutputFormat;
use crate::cli::common::{EXIT_ERROR, EXIT_SUCCESS};
use crate::grammar;
use crate::output::{DirectiveInfo, DirectiveListHumanFormatter, DirectiveListJsonlFormatter};
use std::io::{self, Write};

/// Run the directives command
///
/// # Returns
///
/// Exit code:
/// - 0: Success
/// - 2: Error writing to stdout
pub fn run_directives(format: OutputFormat) -> i32 {
    match run_directives_inner(format) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    }
}

fn run_directives_inner(format: OutputFormat) -> io::Result<()> {
    let directives = directive_infos();
    let rendered = match format {
        OutputFormat::Human => DirectiveListHumanFormatter::new().format(&directives),
        OutputFormat::Jsonl => DirectiveListJsonlFormatter::new().format(&directives),
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()
}

/// Grammar table rows in table order
fn directive_infos() -> Vec<DirectiveInfo> {
    grammar::iter().map(DirectiveInfo::from).collect()
}
