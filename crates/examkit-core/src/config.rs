//! Tunable ingestion options.

use serde::{Deserialize, Serialize};

/// Options shared by the JSON, text and editable paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Title used when the input carries none.
    #[serde(default = "default_title")]
    pub default_title: String,
    /// Longest answer-key answer, in characters, that may be followed by a
    /// parenthesized explanation.
    #[serde(default = "default_short_answer_max_chars")]
    pub short_answer_max_chars: usize,
    /// Drop answer indices that point past the end of `choices`.
    #[serde(default = "default_true")]
    pub validate_answer_range: bool,
}

fn default_title() -> String {
    "Untitled Exam".to_string()
}

fn default_short_answer_max_chars() -> usize {
    24
}

fn default_true() -> bool {
    true
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            short_answer_max_chars: default_short_answer_max_chars(),
            validate_answer_range: true,
        }
    }
}
