//! Editable transcoder.
//!
//! Maps between the canonical model and a flat, human-editable text form.
//! Edits never patch an exam in place: every change to the editable form is
//! re-parsed through the same choice grammar and answer tokenizer used for
//! ingestion, producing a fresh [`ExamData`].

use serde::{Deserialize, Serialize};

use crate::answer::{
    collapse_whitespace, extract_indices, format_choice_label, resolve_text_answer,
    split_short_answer_tokens,
};
use crate::assemble::{assemble_exam, default_id, non_blank, Draft};
use crate::choice::parse_choice_line;
use crate::config::ParseOptions;
use crate::model::{Answer, ExamData, ParseIssue, Question, QuestionType};

/// One question in editable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableQuestion {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub prompt: String,
    /// One choice per line, optionally labelled (`① text`, `2. text`).
    #[serde(default)]
    pub choices_text: String,
    /// The answer as a person would type it (`2, 3`, `O`, `서울 | 서울특별시`).
    #[serde(default)]
    pub answer_text: String,
    #[serde(default)]
    pub explanation: String,
}

/// An exam in editable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableExam {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub questions: Vec<EditableQuestion>,
}

/// A freshly built exam and the issues found building it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcoded {
    pub exam: ExamData,
    pub issues: Vec<ParseIssue>,
}

/// Split `choicesText` into choice texts and, if any line had one, labels.
pub fn parse_choices_text(text: &str) -> (Vec<String>, Option<Vec<String>>) {
    let mut choices = Vec::new();
    let mut labels = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match parse_choice_line(line) {
            Some(choice) => {
                choices.push(collapse_whitespace(&choice.text));
                labels.push(choice.label);
            }
            None => {
                choices.push(collapse_whitespace(line));
                labels.push(None);
            }
        }
    }
    let labels = labels
        .iter()
        .any(Option::is_some)
        .then(|| labels.into_iter().map(Option::unwrap_or_default).collect());
    (choices, labels)
}

/// Re-normalize an editable exam into a canonical one.
///
/// The declared type of each question is kept as given.
pub fn editable_to_exam(editable: &EditableExam, options: &ParseOptions) -> Transcoded {
    let drafts = editable
        .questions
        .iter()
        .enumerate()
        .map(|(position, q)| {
            let (choices, choice_labels) = parse_choices_text(&q.choices_text);
            let answer = resolve_text_answer(q.kind, &q.answer_text, &choices);
            Draft {
                id: default_id(Some(&q.id), position),
                prompt: q.prompt.clone(),
                choices,
                choice_labels,
                answer,
                explanation: non_blank(&q.explanation),
            }
        })
        .collect();

    let title = non_blank(&editable.title).unwrap_or_else(|| options.default_title.clone());
    let mut issues = Vec::new();
    let exam = assemble_exam(title, drafts, options, &mut issues);
    Transcoded { exam, issues }
}

/// Render a canonical exam into its editable form.
pub fn to_editable_exam(exam: &ExamData) -> EditableExam {
    EditableExam {
        title: exam.title.clone(),
        questions: exam.questions.iter().map(to_editable_question).collect(),
    }
}

pub fn to_editable_question(q: &Question) -> EditableQuestion {
    let choices_text = (0..q.choices.len())
        .map(|i| render_choice_line(q, i))
        .collect::<Vec<_>>()
        .join("\n");

    let answer_text = match &q.answer {
        Answer::Short(accepted) => render_short_answers(accepted),
        Answer::Multi(indices) => indices
            .iter()
            .map(|&i| answer_notation(q, i))
            .collect::<Vec<_>>()
            .join(", "),
        Answer::Single(index) => index.map(|i| answer_notation(q, i)).unwrap_or_default(),
        Answer::Ox(index) => match index {
            Some(0) => "O".to_string(),
            Some(_) => "X".to_string(),
            None => String::new(),
        },
    };

    EditableQuestion {
        id: q.id.clone(),
        kind: q.kind(),
        prompt: q.prompt.clone(),
        choices_text,
        answer_text,
        explanation: q.explanation.clone().unwrap_or_default(),
    }
}

/// `<label> <text>`, or a numbered line when that would not parse back.
fn render_choice_line(q: &Question, index: usize) -> String {
    let text = &q.choices[index];
    let reparses = |line: &str| parse_choice_line(line).is_some_and(|c| c.text == *text);

    match q.label(index) {
        Some(_) => {
            let line = format!("{} {}", format_choice_label(q, index), text);
            if reparses(&line) {
                return line;
            }
        }
        None if parse_choice_line(text).is_none() && !text.trim().is_empty() => {
            return text.clone();
        }
        None => {}
    }
    format!("{}. {}", index.saturating_add(1), text)
}

/// The first of label, number, or choice text that resolves back to `index`.
fn answer_notation(q: &Question, index: usize) -> String {
    let number = index.saturating_add(1).to_string();
    let mut candidates = vec![format_choice_label(q, index), number.clone()];
    if let Some(text) = q.choices.get(index) {
        candidates.push(text.clone());
    }
    candidates
        .into_iter()
        .find(|c| extract_indices(c, &q.choices) == [index])
        .unwrap_or(number)
}

fn render_short_answers(accepted: &[String]) -> String {
    // A typed composite that splits into exactly this list reproduces it.
    if let Some(whole) = accepted
        .iter()
        .find(|a| split_short_answer_tokens(a) == accepted)
    {
        return whole.clone();
    }
    accepted
        .iter()
        .filter(|a| !is_composite(a, accepted))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" | ")
}

fn is_composite(candidate: &str, accepted: &[String]) -> bool {
    let tokens = split_short_answer_tokens(candidate);
    tokens.len() > 1 && tokens[..tokens.len() - 1].iter().all(|p| accepted.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(
        id: &str,
        choices: &[&str],
        labels: Option<&[&str]>,
        answer: Answer,
    ) -> Question {
        Question {
            id: id.into(),
            prompt: format!("prompt {id}"),
            choices: choices.iter().map(|c| c.to_string()).collect(),
            choice_labels: labels.map(|l| l.iter().map(|s| s.to_string()).collect()),
            answer,
            explanation: None,
        }
    }

    fn sample_exam() -> ExamData {
        ExamData {
            title: "Sample".into(),
            questions: vec![
                question("Q1", &["x", "y"], Some(&["①", "②"]), Answer::Single(Some(1))),
                question(
                    "Q2",
                    &["red", "green", "blue"],
                    Some(&["A", "B", "C"]),
                    Answer::Multi(vec![0, 2]),
                ),
                question("Q3", &["alpha", "beta"], None, Answer::Single(Some(0))),
                question("Q4", &["O", "X"], None, Answer::Ox(Some(1))),
                question(
                    "Q5",
                    &[],
                    None,
                    Answer::Short(vec!["서울".into(), "서울특별시".into()]),
                ),
                question("Q6", &["a", "b"], Some(&["1", "2"]), Answer::Single(Some(1))),
                question("Q7", &["a", "b"], Some(&["가", "나"]), Answer::Single(Some(1))),
                question("Q8", &["3", "1", "2"], None, Answer::Single(Some(0))),
                question("Q9", &["1) tricky", "plain"], None, Answer::Single(Some(0))),
            ],
        }
    }

    fn assert_equivalent(before: &ExamData, after: &ExamData) {
        assert_eq!(before.questions.len(), after.questions.len());
        for (b, a) in before.questions.iter().zip(&after.questions) {
            assert_eq!(b.id, a.id);
            assert_eq!(b.kind(), a.kind(), "{}", b.id);
            assert_eq!(b.choices, a.choices, "{}", b.id);
            match (&b.answer, &a.answer) {
                (Answer::Short(original), Answer::Short(reparsed)) => {
                    for accepted in original {
                        assert!(reparsed.contains(accepted), "{}: {accepted}", b.id);
                    }
                }
                (original, reparsed) => {
                    assert_eq!(original.indices(), reparsed.indices(), "{}", b.id)
                }
            }
        }
    }

    #[test]
    fn round_trip_keeps_choices_and_answers() {
        let exam = sample_exam();
        let editable = to_editable_exam(&exam);
        let back = editable_to_exam(&editable, &ParseOptions::default());
        assert_equivalent(&exam, &back.exam);
        assert!(back.issues.is_empty(), "{:?}", back.issues);
    }

    #[test]
    fn second_round_trip_is_a_fixed_point() {
        let options = ParseOptions::default();
        let once = editable_to_exam(&to_editable_exam(&sample_exam()), &options).exam;
        let twice = editable_to_exam(&to_editable_exam(&once), &options).exam;
        assert_eq!(once, twice);
    }

    #[test]
    fn rendering() {
        let editable = to_editable_exam(&sample_exam());
        let q = |id: &str| editable.questions.iter().find(|q| q.id == id).unwrap();

        assert_eq!(q("Q1").choices_text, "① x\n② y");
        assert_eq!(q("Q1").answer_text, "②");
        assert_eq!(q("Q2").choices_text, "A. red\nB. green\nC. blue");
        assert_eq!(q("Q2").answer_text, "A., C.");
        assert_eq!(q("Q3").choices_text, "alpha\nbeta");
        assert_eq!(q("Q3").answer_text, "1");
        assert_eq!(q("Q4").answer_text, "X");
        assert_eq!(q("Q5").answer_text, "서울 | 서울특별시");
        assert_eq!(q("Q6").choices_text, "1. a\n2. b");
        assert_eq!(q("Q6").answer_text, "2.");
        assert_eq!(q("Q7").choices_text, "1. a\n2. b");
        assert_eq!(q("Q8").answer_text, "3");
        assert_eq!(q("Q9").choices_text, "1. 1) tricky\nplain");
    }

    #[test]
    fn typed_composite_is_kept_verbatim() {
        let q = question(
            "Q1",
            &[],
            None,
            Answer::Short(vec!["a".into(), "b".into(), "a|b".into()]),
        );
        assert_eq!(to_editable_question(&q).answer_text, "a|b");
    }

    #[test]
    fn declared_type_is_not_reguessed() {
        let editable = EditableExam {
            title: "t".into(),
            questions: vec![EditableQuestion {
                id: "Q1".into(),
                kind: QuestionType::Multi,
                prompt: "pick".into(),
                choices_text: "① a\n② b".into(),
                answer_text: "2".into(),
                explanation: String::new(),
            }],
        };
        let out = editable_to_exam(&editable, &ParseOptions::default());
        assert_eq!(out.exam.questions[0].answer, Answer::Multi(vec![1]));
    }

    #[test]
    fn edits_produce_warnings_and_fresh_ids() {
        let blank = EditableQuestion {
            id: String::new(),
            kind: QuestionType::Single,
            prompt: String::new(),
            choices_text: String::new(),
            answer_text: String::new(),
            explanation: String::new(),
        };
        let editable = EditableExam {
            title: "  ".into(),
            questions: vec![
                EditableQuestion {
                    id: "Q2".into(),
                    ..blank.clone()
                },
                blank.clone(),
            ],
        };
        let out = editable_to_exam(&editable, &ParseOptions::default());
        let ids: Vec<_> = out.exam.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["Q2", "Q2-2"]);
        assert_eq!(out.exam.title, "Untitled Exam");
        for message in [
            "prompt is empty",
            "no choices provided",
            "answer is missing or could not be resolved",
        ] {
            assert!(out.issues.iter().any(|i| i.message == message), "{message}");
        }
        assert_eq!(editable.questions[1].id, "");
    }

    #[test]
    fn parse_choices_text_lines() {
        let (choices, labels) = parse_choices_text("① a\n\n  plain   text \n- bullet");
        assert_eq!(choices, vec!["a", "plain text", "bullet"]);
        assert_eq!(
            labels,
            Some(vec!["①".to_string(), String::new(), String::new()])
        );

        let (choices, _) = parse_choices_text("①  a   b\n2)  c \t d");
        assert_eq!(choices, vec!["a b", "c d"]);

        let (choices, labels) = parse_choices_text("a\nb");
        assert_eq!(choices, vec!["a", "b"]);
        assert!(labels.is_none());
    }

    #[test]
    fn unchecked_index_renders_as_a_number() {
        let q = question("Q1", &["a", "b"], None, Answer::Single(Some(usize::MAX)));
        assert_eq!(to_editable_question(&q).answer_text, usize::MAX.to_string());
    }

    #[test]
    fn editable_serde_uses_camel_case() {
        let editable = to_editable_question(&question(
            "Q1",
            &["a"],
            None,
            Answer::Single(Some(0)),
        ));
        let json = serde_json::to_value(&editable).unwrap();
        assert_eq!(json["type"], "single");
        assert!(json.get("choicesText").is_some());
        assert!(json.get("answerText").is_some());
        let back: EditableQuestion = serde_json::from_value(json).unwrap();
        assert_eq!(back, editable);
    }
}
