//! Core data model types for examkit.
//!
//! These are the canonical, gradeable types every other module produces or
//! consumes: questions, exams, and the diagnostics attached to ingestion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four answer shapes a question can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Exactly one correct choice.
    Single,
    /// One or more correct choices.
    Multi,
    /// Free-text answer compared against accepted strings.
    Short,
    /// True/false, with `O` at index 0 and `X` at index 1.
    Ox,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::Single => write!(f, "single"),
            QuestionType::Multi => write!(f, "multi"),
            QuestionType::Short => write!(f, "short"),
            QuestionType::Ox => write!(f, "ox"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(QuestionType::Single),
            "multi" => Ok(QuestionType::Multi),
            "short" => Ok(QuestionType::Short),
            "ox" | "truefalse" | "tf" => Ok(QuestionType::Ox),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// The resolved answer of a question. The variant decides the question type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Single(Option<usize>),
    /// Ascending, de-duplicated choice indices.
    Multi(Vec<usize>),
    /// Accepted literal strings.
    Short(Vec<String>),
    /// `Some(0)` is O, `Some(1)` is X.
    Ox(Option<usize>),
}

impl Answer {
    /// An empty answer of the given type.
    pub fn empty(kind: QuestionType) -> Self {
        match kind {
            QuestionType::Single => Answer::Single(None),
            QuestionType::Multi => Answer::Multi(Vec::new()),
            QuestionType::Short => Answer::Short(Vec::new()),
            QuestionType::Ox => Answer::Ox(None),
        }
    }

    pub fn kind(&self) -> QuestionType {
        match self {
            Answer::Single(_) => QuestionType::Single,
            Answer::Multi(_) => QuestionType::Multi,
            Answer::Short(_) => QuestionType::Short,
            Answer::Ox(_) => QuestionType::Ox,
        }
    }

    /// Returns `true` if no correct answer could be resolved.
    pub fn is_empty(&self) -> bool {
        match self {
            Answer::Single(index) | Answer::Ox(index) => index.is_none(),
            Answer::Multi(indices) => indices.is_empty(),
            Answer::Short(accepted) => accepted.is_empty(),
        }
    }

    /// Choice indices referenced by this answer.
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Answer::Single(index) | Answer::Ox(index) => index.iter().copied().collect(),
            Answer::Multi(indices) => indices.clone(),
            Answer::Short(_) => Vec::new(),
        }
    }
}

/// One test item in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "QuestionRecord")]
pub struct Question {
    /// Unique within an exam after normalization.
    pub id: String,
    pub prompt: String,
    /// Ordered option texts.
    pub choices: Vec<String>,
    /// Display labels parallel to `choices`; never partially applied.
    pub choice_labels: Option<Vec<String>>,
    pub answer: Answer,
    pub explanation: Option<String>,
}

impl Question {
    pub fn kind(&self) -> QuestionType {
        self.answer.kind()
    }

    /// The explicit label for a choice, if one was captured and is non-blank.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.choice_labels
            .as_ref()
            .and_then(|labels| labels.get(index))
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
    }
}

/// Canonical JSON shape of a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_text: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl From<Question> for QuestionRecord {
    fn from(q: Question) -> Self {
        let kind = q.kind();
        let (answer, answer_text) = match q.answer {
            Answer::Single(index) | Answer::Ox(index) => (index.map(serde_json::Value::from), None),
            Answer::Multi(indices) => (Some(serde_json::Value::from(indices)), None),
            Answer::Short(accepted) => (None, Some(accepted)),
        };
        Self {
            id: q.id,
            kind,
            prompt: q.prompt,
            choices: q.choices,
            choice_labels: q.choice_labels,
            answer,
            answer_text,
            explanation: q.explanation,
        }
    }
}

/// A titled, ordered list of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamData {
    pub title: String,
    pub questions: Vec<Question>,
}

impl ExamData {
    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// Severity of a [`ParseIssue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    /// Nothing was produced.
    Error,
    /// An exam was produced but a field is suspect.
    Warn,
}

impl fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueLevel::Error => write!(f, "error"),
            IssueLevel::Warn => write!(f, "warn"),
        }
    }
}

/// A diagnostic attached to ingestion or transcoding output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseIssue {
    pub level: IssueLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
}

impl ParseIssue {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            message: message.into(),
            question_id: None,
        }
    }

    pub fn warn(question_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warn,
            message: message.into(),
            question_id: question_id.map(str::to_string),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == IssueLevel::Error
    }
}

/// An exam (when one could be built) and the issues found building it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parsed {
    pub exam: Option<ExamData>,
    pub issues: Vec<ParseIssue>,
}

impl Parsed {
    /// Nothing produced; a single error-level issue.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            exam: None,
            issues: vec![ParseIssue::error(message)],
        }
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ParseIssue::is_error)
    }
}
