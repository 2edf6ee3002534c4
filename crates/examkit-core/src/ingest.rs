//! Ingestion entry point: format detection, dispatch, and the output bundle.

use serde::Serialize;

use crate::config::ParseOptions;
use crate::editable::{to_editable_exam, EditableExam};
use crate::json::{normalize_json, parse_lenient};
use crate::model::{ExamData, ParseIssue, Parsed};
use crate::text::parse_text;

/// Detected input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Json,
    Text,
}

/// Result of ingesting one input.
///
/// `exam` and `editable` are both `None` only when `issues` holds an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingested {
    pub exam: Option<ExamData>,
    pub editable: Option<EditableExam>,
    pub issues: Vec<ParseIssue>,
}

impl Ingested {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ParseIssue::is_error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ParseIssue> {
        self.issues.iter().filter(|i| !i.is_error())
    }
}

impl From<Parsed> for Ingested {
    fn from(parsed: Parsed) -> Self {
        let editable = parsed.exam.as_ref().map(to_editable_exam);
        Self {
            exam: parsed.exam,
            editable,
            issues: parsed.issues,
        }
    }
}

/// Decide between JSON and text from the filename hint and the content.
pub fn detect_format(content: &str, filename: Option<&str>) -> InputFormat {
    let json_name = filename.is_some_and(|name| name.to_lowercase().ends_with(".json"));
    let head = content.trim_start();
    if json_name || head.starts_with('{') || head.starts_with('[') || head.starts_with("```json")
    {
        InputFormat::Json
    } else {
        InputFormat::Text
    }
}

/// Ingest raw content with default options.
pub fn ingest(content: &str, filename: Option<&str>) -> Ingested {
    ingest_with(content, filename, &ParseOptions::default())
}

/// Ingest raw content, treating it as JSON or plain text.
pub fn ingest_with(content: &str, filename: Option<&str>, options: &ParseOptions) -> Ingested {
    if content.trim().is_empty() {
        return Parsed::failed("input is empty").into();
    }

    let format = detect_format(content, filename);
    tracing::debug!(?format, filename, bytes = content.len(), "ingesting input");

    let parsed = match format {
        InputFormat::Json => match parse_lenient(content) {
            Ok(value) => normalize_json(&value, options),
            Err(e) => {
                tracing::warn!(error = %e, "JSON input could not be recovered");
                Parsed::failed(format!("could not parse JSON: {e}"))
            }
        },
        InputFormat::Text => parse_text(content, options),
    };

    parsed.into()
}
