//! Question assembly shared by the JSON, text and editable paths.
//!
//! Each path produces [`Draft`]s with a resolved answer; this module gives
//! them unique ids, fills per-type defaults and emits the warn issues.

use std::collections::HashSet;

use crate::answer::ox_choices;
use crate::config::ParseOptions;
use crate::model::{Answer, ExamData, ParseIssue, Question, QuestionType};

/// A question whose fields have been read but not yet checked.
#[derive(Debug, Clone)]
pub(crate) struct Draft {
    pub id: String,
    pub prompt: String,
    pub choices: Vec<String>,
    pub choice_labels: Option<Vec<String>>,
    pub answer: Answer,
    pub explanation: Option<String>,
}

/// Trimmed id, or `Q<position + 1>` when blank.
pub(crate) fn default_id(id: Option<&str>, position: usize) -> String {
    match id.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("Q{}", position + 1),
    }
}

/// Trimmed text, or `None` when blank.
pub(crate) fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Rename later duplicates to `<id>-2`, `<id>-3`, ... in encounter order.
pub(crate) fn dedupe_ids<'a>(ids: impl IntoIterator<Item = &'a mut String>) {
    let mut seen = HashSet::new();
    for id in ids {
        if seen.insert(id.clone()) {
            continue;
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{id}-{suffix}");
            if seen.insert(candidate.clone()) {
                *id = candidate;
                break;
            }
            suffix += 1;
        }
    }
}

/// Build an exam from drafts: unique ids first, then per-question checks.
pub(crate) fn assemble_exam(
    title: String,
    mut drafts: Vec<Draft>,
    options: &ParseOptions,
    issues: &mut Vec<ParseIssue>,
) -> ExamData {
    dedupe_ids(drafts.iter_mut().map(|d| &mut d.id));

    let questions: Vec<Question> = drafts
        .into_iter()
        .map(|draft| finish(draft, options, issues))
        .collect();

    tracing::debug!(
        questions = questions.len(),
        warnings = issues.len(),
        "assembled exam"
    );

    ExamData { title, questions }
}

fn finish(draft: Draft, options: &ParseOptions, issues: &mut Vec<ParseIssue>) -> Question {
    let Draft {
        id,
        prompt,
        mut choices,
        choice_labels,
        mut answer,
        explanation,
    } = draft;
    let kind = answer.kind();
    let qid = Some(id.as_str());

    if prompt.trim().is_empty() {
        issues.push(ParseIssue::warn(qid, "prompt is empty"));
    }

    match kind {
        QuestionType::Single | QuestionType::Multi if choices.is_empty() => {
            issues.push(ParseIssue::warn(qid, "no choices provided"));
        }
        QuestionType::Ox if choices.is_empty() => choices = ox_choices(),
        _ => {}
    }

    let choice_labels = choice_labels.filter(|labels| labels.len() == choices.len());

    if options.validate_answer_range && !choices.is_empty() {
        let len = choices.len();
        let mut out_of_range = Vec::new();
        match &mut answer {
            Answer::Single(index) | Answer::Ox(index) => {
                if let Some(i) = index.filter(|&i| i >= len) {
                    out_of_range.push(i);
                    *index = None;
                }
            }
            Answer::Multi(indices) => {
                out_of_range.extend(indices.iter().copied().filter(|&i| i >= len));
                indices.retain(|&i| i < len);
            }
            Answer::Short(_) => {}
        }
        for i in out_of_range {
            issues.push(ParseIssue::warn(
                qid,
                format!(
                    "answer refers to choice {} but only {len} choice(s) exist",
                    i.saturating_add(1)
                ),
            ));
        }
    }

    if answer.is_empty() {
        issues.push(ParseIssue::warn(
            qid,
            "answer is missing or could not be resolved",
        ));
    }

    Question {
        id,
        prompt: prompt.trim().to_string(),
        choices,
        choice_labels,
        answer,
        explanation,
    }
}
