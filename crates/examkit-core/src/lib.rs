//! examkit-core: exam ingestion, normalization, editing and grading.
//!
//! This crate turns JSON or loosely structured prose into a canonical exam
//! model, maps it to and from a human-editable form, and scores answers
//! against it. Everything here is a pure transform; diagnostics come back as
//! [`ParseIssue`](model::ParseIssue) data alongside the best result possible.

pub mod answer;
pub(crate) mod assemble;
pub mod choice;
pub mod config;
pub mod editable;
pub mod error;
pub mod grade;
pub mod ingest;
pub mod json;
pub mod model;
pub mod text;

pub use config::ParseOptions;
pub use editable::{editable_to_exam, to_editable_exam, EditableExam, EditableQuestion};
pub use grade::{grade, GradeSummary, QuestionResult, UserAnswer};
pub use ingest::{ingest, ingest_with, Ingested};
pub use model::{Answer, ExamData, IssueLevel, ParseIssue, Question, QuestionType};
