//! JSON input error types.
//!
//! Ingestion reports problems as [`ParseIssue`](crate::model::ParseIssue)
//! data. The lenient JSON reader is the one step that can fail outright, and
//! its failure is typed here so callers can tell empty input from text that
//! resisted every recovery strategy.

use thiserror::Error;

/// Errors from [`parse_lenient`](crate::json::parse_lenient).
#[derive(Debug, Error)]
pub enum JsonInputError {
    /// The input was empty or whitespace-only.
    #[error("input is empty")]
    Empty,

    /// No recovery strategy produced valid JSON.
    #[error("invalid JSON after {attempts} recovery attempt(s): {source}")]
    Malformed {
        attempts: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl JsonInputError {
    /// Line and column of the first parse failure, if known.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            JsonInputError::Malformed { source, .. } => Some((source.line(), source.column())),
            JsonInputError::Empty => None,
        }
    }
}
