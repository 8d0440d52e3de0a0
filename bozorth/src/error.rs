use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading templates or talking to the reference tool.
///
/// The matching pipeline itself never fails.
#[derive(Error, Debug)]
pub enum Error {
    /// A record is not exactly three integers, or its orientation is out of range.
    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// The input source does not exist.
    #[error("Template not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The reference tool could not be started.
    #[error("Cannot start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The reference tool exited with a failure; carries its standard error.
    #[error("External tool failed (exit code {code:?}): {stderr}")]
    ExternalTool { code: Option<i32>, stderr: String },
}
