//! Answer tokenizer.
//!
//! Turns the answer notations people actually type (circled numerals, `2번`,
//! `B`, `O`, literal choice text, `서울 | 서울특별시`) into resolved answers,
//! and formats choice labels back for display.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Answer, Question, QuestionType};

/// Circled numerals ① through ⑩, mapped to indices 0 through 9.
pub const CIRCLED: [char; 10] = ['①', '②', '③', '④', '⑤', '⑥', '⑦', '⑧', '⑨', '⑩'];

const BRACKETS: &[char] = &[
    '(', ')', '[', ']', '{', '}', '<', '>', '「', '」', '『', '』', '【', '】',
];

const SEPARATOR_GLYPHS: &[char] = &['、', '，', '；', '·'];

static TOKEN_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,/|;\s]+").expect("token split pattern is valid"));

static SHORT_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[|,;/]+").expect("short answer split pattern is valid"));

/// Index of a circled numeral glyph.
pub fn circled_index(c: char) -> Option<usize> {
    CIRCLED.iter().position(|&g| g == c)
}

/// Returns `true` if `label` is exactly one circled numeral.
pub fn is_circled(label: &str) -> bool {
    let mut chars = label.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if circled_index(c).is_some())
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn comparable(s: &str) -> String {
    collapse_whitespace(s).to_lowercase()
}

/// The implicit choices of an O/X question.
pub fn ox_choices() -> Vec<String> {
    vec!["O".to_string(), "X".to_string()]
}

fn clean_answer(raw: &str) -> String {
    let mapped: String = raw
        .chars()
        .filter(|c| !BRACKETS.contains(c))
        .map(|c| if SEPARATOR_GLYPHS.contains(&c) { ',' } else { c })
        .collect();
    collapse_whitespace(&mapped)
}

fn match_choice(text: &str, choices: &[String]) -> Option<usize> {
    let wanted = comparable(text);
    if wanted.is_empty() {
        return None;
    }
    choices.iter().position(|c| comparable(c) == wanted)
}

fn token_index(token: &str, choices: &[String]) -> Option<usize> {
    let first = token.chars().next()?;
    if let Some(index) = circled_index(first) {
        return Some(index);
    }

    if let Some(start) = token.find(|c: char| c.is_ascii_digit()) {
        let digits: String = token[start..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        if let Ok(n) = digits.parse::<usize>() {
            if n > 0 {
                return Some(n - 1);
            }
        }
    }

    if token.chars().count() == 1 && first.is_ascii_alphabetic() {
        return Some((first.to_ascii_uppercase() as u8 - b'A') as usize);
    }

    match_choice(token, choices)
}

/// Resolve a raw answer string into 0-based choice indices, ascending.
///
/// A string that is exactly one of the choices resolves to that choice.
/// Otherwise each token is read as a circled numeral, a 1-based number, a
/// letter (`A` = 0), or a choice text, in that order.
pub fn extract_indices(raw: &str, choices: &[String]) -> Vec<usize> {
    if let Some(index) = match_choice(raw, choices) {
        return vec![index];
    }

    let cleaned = clean_answer(raw);
    if cleaned.is_empty() {
        return Vec::new();
    }
    if let Some(index) = match_choice(&cleaned, choices) {
        return vec![index];
    }

    let mut found = BTreeSet::new();
    for token in TOKEN_SPLIT.split(&cleaned) {
        let token = token.trim_matches('.');
        if token.is_empty() {
            continue;
        }
        if let Some(index) = token_index(token, choices) {
            found.insert(index);
        }
    }
    found.into_iter().collect()
}

/// Read an O/X answer: `Some(0)` for O, `Some(1)` for X.
pub fn parse_ox(raw: &str) -> Option<usize> {
    let value = raw
        .trim()
        .trim_matches(|c: char| BRACKETS.contains(&c) || c == '.')
        .trim()
        .to_lowercase();
    match value.as_str() {
        "o" | "true" | "t" | "예" | "○" => Some(0),
        "x" | "false" | "f" | "아니오" | "×" | "✕" => Some(1),
        _ => None,
    }
}

/// Infer a question type from its choices and raw answer.
pub fn guess_type(choices: &[String], answer_raw: &str) -> QuestionType {
    if parse_ox(answer_raw).is_some() {
        return QuestionType::Ox;
    }
    if choices.is_empty() {
        return QuestionType::Short;
    }
    let delimited = answer_raw
        .trim()
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, ',' | '/' | '|' | ';'));
    if delimited && extract_indices(answer_raw, choices).len() > 1 {
        QuestionType::Multi
    } else {
        QuestionType::Single
    }
}

/// Split a short answer into accepted alternatives.
///
/// When more than one part results, the whole trimmed string is accepted too.
pub fn split_short_answer_tokens(raw: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for part in SHORT_SPLIT.split(raw) {
        let part = part.trim();
        if !part.is_empty() && !tokens.iter().any(|t| t == part) {
            tokens.push(part.to_string());
        }
    }
    if tokens.len() > 1 {
        let whole = raw.trim();
        if !tokens.iter().any(|t| t == whole) {
            tokens.push(whole.to_string());
        }
    }
    tokens
}

/// Resolve a free-text answer for a question of a known type.
pub fn resolve_text_answer(kind: QuestionType, raw: &str, choices: &[String]) -> Answer {
    match kind {
        QuestionType::Single => Answer::Single(extract_indices(raw, choices).first().copied()),
        QuestionType::Multi => Answer::Multi(extract_indices(raw, choices)),
        QuestionType::Short => Answer::Short(split_short_answer_tokens(raw)),
        QuestionType::Ox => Answer::Ox(
            parse_ox(raw).or_else(|| extract_indices(raw, &ox_choices()).first().copied()),
        ),
    }
}

/// Display label for a choice: `①`, `2.`, `A.`, or `index + 1` without a period.
pub fn format_choice_label(question: &Question, index: usize) -> String {
    match question.label(index) {
        Some(label) => match question.kind() {
            QuestionType::Ox => label.to_string(),
            _ if is_circled(label) => label.to_string(),
            _ if label.chars().all(char::is_alphanumeric) => format!("{label}."),
            _ => label.to_string(),
        },
        None => index.saturating_add(1).to_string(),
    }
}
