//! JSON exam normalizer.
//!
//! Reads JSON text leniently (code fences, smart quotes, trailing commas and
//! stray inner quotes are repaired before giving up) and maps the parsed value
//! onto the canonical model, inferring whatever fields are missing.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::answer::{
    collapse_whitespace, extract_indices, guess_type, ox_choices, parse_ox,
    split_short_answer_tokens,
};
use crate::assemble::{assemble_exam, default_id, non_blank, Draft};
use crate::config::ParseOptions;
use crate::error::JsonInputError;
use crate::model::{Answer, ParseIssue, Parsed, QuestionType};

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(\s*[}\]])").expect("trailing comma pattern is valid"));

type Repair = fn(&str) -> String;

/// Repairs applied cumulatively, in order, until the text parses.
const REPAIRS: [(&str, Repair); 4] = [
    ("unfence", unfence),
    ("straighten quotes", straighten_quotes),
    ("trailing commas", strip_trailing_commas),
    ("inner quotes", escape_inner_quotes),
];

/// Parse JSON text, repairing common damage from hand editing or LLM output.
pub fn parse_lenient(text: &str) -> Result<Value, JsonInputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(JsonInputError::Empty);
    }

    let first_error = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let mut attempts = 1;
    let mut candidate = trimmed.to_string();
    for (name, repair) in REPAIRS {
        let repaired = repair(&candidate);
        if repaired == candidate {
            continue;
        }
        candidate = repaired;
        attempts += 1;
        match serde_json::from_str::<Value>(&candidate) {
            Ok(value) => {
                tracing::debug!(repair = name, attempts, "recovered malformed JSON");
                return Ok(value);
            }
            Err(e) => tracing::trace!(repair = name, "JSON still invalid: {e}"),
        }
    }

    Err(JsonInputError::Malformed {
        attempts,
        source: first_error,
    })
}

/// Take the JSON out of a markdown code fence, or out of surrounding prose.
fn unfence(text: &str) -> String {
    let mut json_blocks = Vec::new();
    let mut other_blocks = Vec::new();
    let mut in_block = false;
    let mut is_json_block = false;
    let mut current_block = String::new();

    for line in text.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json" || lang == "jsonc";
            current_block.clear();
            continue;
        }

        if in_block && trimmed.starts_with("```") {
            in_block = false;
            if is_json_block {
                json_blocks.push(current_block.clone());
            } else {
                other_blocks.push(current_block.clone());
            }
            continue;
        }

        if in_block {
            current_block.push_str(line);
            current_block.push('\n');
        }
    }

    // Unclosed fence: keep what was collected.
    if in_block && !current_block.is_empty() {
        if is_json_block {
            json_blocks.push(current_block);
        } else {
            other_blocks.push(current_block);
        }
    }

    let body = json_blocks
        .into_iter()
        .chain(other_blocks)
        .next()
        .unwrap_or_else(|| text.to_string());

    let start = body.find(|c: char| c == '{' || c == '[');
    let end = body.rfind(|c: char| c == '}' || c == ']');
    match (start, end) {
        (Some(start), Some(end)) if start < end => body[start..=end].to_string(),
        _ => body.trim().to_string(),
    }
}

fn straighten_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}

fn strip_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

/// Escape quotes inside string literals that do not end the string.
///
/// A quote closes a string only when the next non-blank character is one of
/// `,` `:` `}` `]` or the end of input.
fn escape_inner_quotes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            i += 1;
            continue;
        }

        match c {
            '\\' => {
                out.push(c);
                if let Some(&escaped) = chars.get(i + 1) {
                    out.push(escaped);
                    i += 1;
                }
            }
            '"' => {
                let next = chars[i + 1..].iter().copied().find(|c| !c.is_whitespace());
                if matches!(next, None | Some(',' | ':' | '}' | ']')) {
                    in_string = false;
                    out.push('"');
                } else {
                    out.push_str("\\\"");
                }
            }
            '\n' => out.push_str("\\n"),
            '\r' => {}
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
        i += 1;
    }

    out
}

/// Map a parsed JSON value (object or bare array) onto the canonical model.
pub fn normalize_json(value: &Value, options: &ParseOptions) -> Parsed {
    let (title, entries): (Option<&str>, &[Value]) = match value {
        Value::Array(items) => (None, items.as_slice()),
        Value::Object(map) => (
            map.get("title").and_then(Value::as_str),
            map.get("questions")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        ),
        _ => return Parsed::failed("JSON input must be an object or an array of questions"),
    };

    let mut issues = Vec::new();
    let mut drafts = Vec::new();
    for (position, entry) in entries.iter().enumerate() {
        match entry.as_object() {
            Some(fields) => drafts.push(read_question(fields, position, &mut issues)),
            None => issues.push(ParseIssue::warn(
                None,
                format!("question {} is not an object and was skipped", position + 1),
            )),
        }
    }

    if drafts.is_empty() {
        issues.push(ParseIssue::error("no questions found"));
        return Parsed {
            exam: None,
            issues,
        };
    }

    let title = title
        .and_then(non_blank)
        .unwrap_or_else(|| options.default_title.clone());
    let exam = assemble_exam(title, drafts, options, &mut issues);
    Parsed {
        exam: Some(exam),
        issues,
    }
}

/// A string, number or bool rendered as text; `None` for anything else.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|v| !v.is_null())
}

fn read_question(
    fields: &Map<String, Value>,
    position: usize,
    issues: &mut Vec<ParseIssue>,
) -> Draft {
    let id = default_id(present(fields, "id").and_then(scalar_text).as_deref(), position);

    let prompt = present(fields, "prompt")
        .and_then(scalar_text)
        .unwrap_or_default();

    let choices: Vec<String> = present(fields, "choices")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(scalar_text)
                .map(|c| collapse_whitespace(&c))
                .collect()
        })
        .unwrap_or_default();

    let choice_labels = present(fields, "choiceLabels")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|l| scalar_text(l).map(|l| l.trim().to_string()).unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .filter(|labels| labels.len() == choices.len());

    let answer = present(fields, "answer");
    let answer_text = present(fields, "answerText");

    let declared = present(fields, "type").and_then(Value::as_str);
    let kind = match declared.map(str::parse::<QuestionType>) {
        Some(Ok(kind)) => kind,
        Some(Err(e)) => {
            issues.push(ParseIssue::warn(Some(&id), format!("{e}; type was inferred")));
            infer_kind(&choices, answer, answer_text, &id, issues)
        }
        None => infer_kind(&choices, answer, answer_text, &id, issues),
    };

    let answer = resolve_answer(kind, answer, answer_text, &choices);

    let explanation = present(fields, "explanation")
        .and_then(Value::as_str)
        .and_then(non_blank);

    Draft {
        id,
        prompt,
        choices,
        choice_labels,
        answer,
        explanation,
    }
}

fn infer_kind(
    choices: &[String],
    answer: Option<&Value>,
    answer_text: Option<&Value>,
    id: &str,
    issues: &mut Vec<ParseIssue>,
) -> QuestionType {
    let raw = answer
        .and_then(Value::as_str)
        .or_else(|| answer_text.and_then(Value::as_str));

    if !choices.is_empty() {
        if let Some(raw) = raw {
            return guess_type(choices, raw);
        }
        return match answer.and_then(Value::as_array) {
            Some(items) if items.len() > 1 => QuestionType::Multi,
            _ => QuestionType::Single,
        };
    }

    if raw.is_some() || answer_text.is_some_and(Value::is_array) {
        return QuestionType::Short;
    }

    issues.push(ParseIssue::warn(Some(id), "type was guessed"));
    QuestionType::Short
}

fn resolve_answer(
    kind: QuestionType,
    answer: Option<&Value>,
    answer_text: Option<&Value>,
    choices: &[String],
) -> Answer {
    match kind {
        QuestionType::Short => Answer::Short(short_answers(answer_text.or(answer))),
        QuestionType::Ox => Answer::Ox(answer.or(answer_text).and_then(ox_value)),
        QuestionType::Single => Answer::Single(
            choice_indices(answer.or(answer_text), choices)
                .first()
                .copied(),
        ),
        QuestionType::Multi => Answer::Multi(choice_indices(answer.or(answer_text), choices)),
    }
}

fn short_answers(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => {
            let mut accepted: Vec<String> = Vec::new();
            for item in items.iter().filter_map(scalar_text) {
                let item = item.trim();
                if !item.is_empty() && !accepted.iter().any(|a| a == item) {
                    accepted.push(item.to_string());
                }
            }
            accepted
        }
        Some(other) => scalar_text(other)
            .map(|raw| split_short_answer_tokens(&raw))
            .unwrap_or_default(),
        None => Vec::new(),
    }
}

fn ox_value(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => Some(if n.as_f64() == Some(0.0) { 0 } else { 1 }),
        Value::Bool(b) => Some(if *b { 0 } else { 1 }),
        Value::String(s) => {
            parse_ox(s).or_else(|| extract_indices(s, &ox_choices()).first().copied())
        }
        Value::Array(items) => items.first().and_then(ox_value),
        _ => None,
    }
}

/// Numbers are literal 0-based indices; strings go through the tokenizer.
fn choice_indices(value: Option<&Value>, choices: &[String]) -> Vec<usize> {
    fn collect(value: &Value, choices: &[String], found: &mut BTreeSet<usize>) {
        match value {
            Value::Number(n) => {
                if let Some(index) = n.as_u64() {
                    found.insert(usize::try_from(index).unwrap_or(usize::MAX));
                } else if let Some(f) = n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0) {
                    found.insert(f as usize);
                }
            }
            Value::String(s) => found.extend(extract_indices(s, choices)),
            Value::Array(items) => {
                for item in items {
                    collect(item, choices, found);
                }
            }
            _ => {}
        }
    }

    let mut found = BTreeSet::new();
    if let Some(value) = value {
        collect(value, choices, &mut found);
    }
    found.into_iter().collect()
}
