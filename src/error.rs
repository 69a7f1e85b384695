//! Provides [InterpretationError], the error type returned by the binary's
//! top-level operations: reading a source file, parsing it, and running it.
//!
//! Evaluation failures that occur *inside* a running program are not part
//! of this type — those are [crate::value::Value::Error] values, a
//! first-class runtime value the evaluator produces and propagates on its
//! own (see `spec.md` §7). [InterpretationError::Runtime] exists only to
//! carry such a value's message out to the CLI once evaluation has
//! finished and the program as a whole is reported as failed.
use thiserror::Error;

/// Any error that can occur while reading, parsing, or running a script.
#[derive(Debug, Error)]
pub enum InterpretationError {
    /// The source file named on the command line could not be read.
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// One or more syntax errors were found while parsing. Carries every
    /// message the parser accumulated, not just the first.
    #[error("{} parse error(s):\n{}", .0.len(), .0.join("\n"))]
    Parse(Vec<String>),
    /// The program evaluated to a top-level [crate::value::Value::Error].
    #[error("runtime error: {0}")]
    Runtime(String),
}
