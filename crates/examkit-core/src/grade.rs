//! Grading engine: scores user answers against a canonical exam.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::answer::{collapse_whitespace, format_choice_label};
use crate::model::{Answer, ExamData, Question, QuestionType};

/// A user's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserAnswer {
    Index(usize),
    Indices(Vec<usize>),
    Text(String),
}

/// Outcome for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub answered: bool,
    pub correct: bool,
    /// What the user answered, rendered for display.
    pub user_display: Option<String>,
    pub correct_display: String,
}

/// Aggregate outcome for an exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummary {
    pub total: usize,
    pub correct: usize,
    /// Answered but wrong.
    pub incorrect: usize,
    pub unanswered: usize,
    /// Integer percentage of correct answers.
    pub accuracy: u32,
    pub results: Vec<QuestionResult>,
}

/// Grade `answers` (keyed by question id) against `exam`, in question order.
pub fn grade(exam: &ExamData, answers: &HashMap<String, UserAnswer>) -> GradeSummary {
    let results: Vec<QuestionResult> = exam
        .questions
        .iter()
        .map(|q| grade_question(q, answers.get(&q.id)))
        .collect();

    let total = results.len();
    let correct = results.iter().filter(|r| r.correct).count();
    let unanswered = results.iter().filter(|r| !r.answered).count();
    let accuracy = if total == 0 {
        0
    } else {
        (correct as f64 / total as f64 * 100.0).round() as u32
    };

    tracing::debug!(total, correct, unanswered, accuracy, "graded exam");

    GradeSummary {
        total,
        correct,
        incorrect: total - correct - unanswered,
        unanswered,
        accuracy,
        results,
    }
}

/// Grade one question against an optional user answer.
pub fn grade_question(question: &Question, user: Option<&UserAnswer>) -> QuestionResult {
    let answered = is_answered(question.kind(), user);
    let correct = answered && user.is_some_and(|u| is_correct(&question.answer, u));

    QuestionResult {
        question_id: question.id.clone(),
        kind: question.kind(),
        answered,
        correct,
        user_display: user.filter(|_| answered).map(|u| user_display(question, u)),
        correct_display: correct_display(question),
    }
}

fn is_answered(kind: QuestionType, user: Option<&UserAnswer>) -> bool {
    match (kind, user) {
        (QuestionType::Short, Some(UserAnswer::Text(text))) => !text.trim().is_empty(),
        (QuestionType::Multi, Some(UserAnswer::Indices(indices))) => !indices.is_empty(),
        (QuestionType::Single | QuestionType::Ox, Some(UserAnswer::Index(_))) => true,
        _ => false,
    }
}

fn normalized(s: &str) -> String {
    collapse_whitespace(s).to_lowercase()
}

fn is_correct(answer: &Answer, user: &UserAnswer) -> bool {
    match (answer, user) {
        (Answer::Short(accepted), UserAnswer::Text(text)) => {
            let text = normalized(text);
            accepted.iter().any(|a| normalized(a) == text)
        }
        (Answer::Multi(expected), UserAnswer::Indices(given)) => {
            let expected: BTreeSet<_> = expected.iter().collect();
            let given: BTreeSet<_> = given.iter().collect();
            expected == given
        }
        (Answer::Single(expected) | Answer::Ox(expected), UserAnswer::Index(given)) => {
            *expected == Some(*given)
        }
        _ => false,
    }
}

fn choice_display(question: &Question, index: usize) -> String {
    let label = format_choice_label(question, index);
    match question.choices.get(index) {
        Some(text) if question.kind() != QuestionType::Ox || label != *text => {
            format!("{label} {text}")
        }
        _ => label,
    }
}

fn join_choices(question: &Question, indices: &[usize]) -> String {
    indices
        .iter()
        .map(|&i| choice_display(question, i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn user_display(question: &Question, user: &UserAnswer) -> String {
    match user {
        UserAnswer::Text(text) => text.trim().to_string(),
        UserAnswer::Index(index) => choice_display(question, *index),
        UserAnswer::Indices(indices) => {
            let sorted: BTreeSet<usize> = indices.iter().copied().collect();
            join_choices(question, &sorted.into_iter().collect::<Vec<_>>())
        }
    }
}

fn correct_display(question: &Question) -> String {
    match &question.answer {
        Answer::Short(accepted) => accepted.join(", "),
        other => join_choices(question, &other.indices()),
    }
}
