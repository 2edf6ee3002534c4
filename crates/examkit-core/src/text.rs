//! Plain-text exam parser.
//!
//! A heuristic, line-oriented grammar for exams written as prose or loose
//! markdown. Parsing runs in four steps:
//!
//! 1. Split off a trailing answer-key section at the first standalone
//!    `정답` / `Answer Key` heading (a line with a colon never counts).
//! 2. Read the answer key into `Q<n>` -> answer/explanation entries.
//! 3. Run the question region through a line state machine that groups lines
//!    into question blocks.
//! 4. Finalize each block, filling its answer and explanation from the key
//!    when the block itself supplied none.
//!
//! Line classification is order-sensitive, and whether the previous line was
//! blank decides if a bare `2)` starts a question or is a numbered choice.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::answer::{collapse_whitespace, guess_type, resolve_text_answer};
use crate::assemble::{assemble_exam, default_id, non_blank, Draft};
use crate::choice::{parse_choice_line, ChoiceLine};
use crate::config::ParseOptions;
use crate::model::{ParseIssue, Parsed};

static MARKDOWN_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#{1,6}\s+").expect("heading pattern is valid"));

static BLOCKQUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^>\s*").expect("blockquote pattern is valid"));

static DIVIDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-{3,}$").expect("divider pattern is valid"));

static ANSWER_KEY_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:정답(?:\s*(?:및|과|/)\s*해설)?|해설\s*및\s*정답|answer\s*key|answers)$")
        .expect("answer key header pattern is valid")
});

static INLINE_ANSWER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(?:정답|answers?)\s*[:：)\-]|[\[【](?:정답|answers?)[\]】])\s*(.*)$")
        .expect("inline answer pattern is valid")
});

static INLINE_EXPLANATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(?:해설|explanation)\s*[:：)\-]|[\[【](?:해설|explanation)[\]】])\s*(.*)$")
        .expect("inline explanation pattern is valid")
});

static NAMED_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:문제|question)\s*#?\s*(\d+)\s*[)\.:]?\s*(.*)$")
        .expect("named question pattern is valid")
});

static Q_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[Qq]\s*(\d+)\s*[)\.:]?\s*(.*)$").expect("Q question pattern is valid")
});

static HASH_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#\s*(\d+)\s*[)\.:]?\s*(.*)$").expect("hash question pattern is valid")
});

// The rest may not start with a digit, so `1.5 liters` is not a question.
static BARE_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\s*[)\.]\s*(\D.*)?$").expect("bare question pattern is valid")
});

static KEY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[Qq]|문제)?\s*(\d+)(?:(?:\s*[)\.:]|\s)\s*(.+)|([^\d\s)\.:].*))$")
        .expect("answer key line pattern is valid")
});

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern is valid"));

static TRAILING_PAREN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)\s*[(（]([^()（）]*)[)）]\s*$").expect("trailing paren pattern is valid")
});

const HEADING_KEYWORDS: &[&str] = &["문제", "문항", "시험", "questions", "quiz", "exam"];

/// Remove markdown emphasis, heading and blockquote markers.
fn strip_markdown(line: &str) -> String {
    let line = line.trim();
    let line = MARKDOWN_HEADING.replace(line, "");
    let line = BLOCKQUOTE.replace(&line, "");
    line.replace("**", "")
        .replace("__", "")
        .replace('`', "")
        .trim()
        .to_string()
}

fn is_heading(raw: &str, stripped: &str) -> bool {
    if MARKDOWN_HEADING.is_match(raw.trim()) {
        return true;
    }
    let keyword = stripped.trim_end_matches([':', '：']).trim().to_lowercase();
    HEADING_KEYWORDS.contains(&keyword.as_str())
}

fn is_answer_key_header(line: &str) -> bool {
    if line.contains(':') || line.contains('：') {
        return false;
    }
    let stripped = strip_markdown(line);
    let inner = stripped
        .trim_start_matches(['[', '【', '<', '('])
        .trim_end_matches([']', '】', '>', ')'])
        .trim();
    ANSWER_KEY_HEADER.is_match(inner)
}

/// Answer and explanation for one question number in the answer key.
#[derive(Debug, Clone, PartialEq, Eq)]
struct KeyEntry {
    answer: String,
    explanation: Option<String>,
}

fn remove_outer_parens(text: &str) -> &str {
    let text = text.trim();
    for (open, close) in [('(', ')'), ('（', '）')] {
        if let Some(inner) = text.strip_prefix(open).and_then(|t| t.strip_suffix(close)) {
            return inner.trim();
        }
    }
    text
}

fn looks_like_short_token(head: &str, max_chars: usize) -> bool {
    let count = head.chars().count();
    count <= max_chars
        || (count == 1 && head.chars().all(|c| c.is_ascii_alphabetic()))
        || matches!(head, "O" | "X" | "o" | "x")
}

fn parse_key_entry(rest: &str, max_chars: usize) -> KeyEntry {
    let rest = rest.trim();

    if let Some(caps) = BOLD.captures(rest) {
        let span = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        let answer = caps[1].trim().to_string();
        let leftover = format!("{}{}", &rest[..span.start], &rest[span.end..]);
        let leftover = strip_markdown(&leftover);
        let leftover = leftover.trim_start_matches(['-', ':', '–', '—']);
        return KeyEntry {
            answer,
            explanation: non_blank(remove_outer_parens(leftover)),
        };
    }

    if let Some(answer) = rest.strip_prefix("예:").or_else(|| rest.strip_prefix("예)")) {
        return KeyEntry {
            answer: strip_markdown(answer),
            explanation: None,
        };
    }

    let plain = strip_markdown(rest);
    if let Some(caps) = TRAILING_PAREN.captures(&plain) {
        let head = caps[1].trim();
        if !head.is_empty() && looks_like_short_token(head, max_chars) {
            return KeyEntry {
                answer: head.to_string(),
                explanation: non_blank(&caps[2]),
            };
        }
    }

    KeyEntry {
        answer: plain,
        explanation: None,
    }
}

fn parse_answer_key(lines: &[&str], max_chars: usize) -> HashMap<String, KeyEntry> {
    let mut entries = HashMap::new();
    for raw in lines {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let stripped = strip_markdown(raw);
        if DIVIDER.is_match(&stripped) || is_heading(raw, &stripped) {
            continue;
        }
        let caps = match KEY_LINE.captures(raw).or_else(|| KEY_LINE.captures(&stripped)) {
            Some(caps) => caps,
            None => continue,
        };
        let number = canonical_number(&caps[1]);
        let Some(rest) = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str()) else {
            continue;
        };
        entries
            .entry(format!("Q{number}"))
            .or_insert_with(|| parse_key_entry(rest, max_chars));
    }
    entries
}

fn canonical_number(digits: &str) -> String {
    digits
        .parse::<u64>()
        .map(|n| n.to_string())
        .unwrap_or_else(|_| digits.to_string())
}

/// Lines accumulated for one question.
#[derive(Debug, Default)]
struct Block {
    id: Option<String>,
    prompt: Vec<String>,
    choices: Vec<String>,
    labels: Vec<Option<String>>,
    answer: Option<String>,
    explanation: Vec<String>,
}

/// What a non-blank line means, given the current state.
#[derive(Debug)]
enum Line {
    Answer(String),
    Explanation(String),
    QuestionStart { number: String, rest: String },
    Choice(ChoiceLine),
    /// A markdown heading before the first question.
    Title(String),
    Ignored,
    Text(String),
}

/// The question-region state machine.
#[derive(Debug, Default)]
struct LineMachine {
    title: Option<String>,
    committed: Vec<Block>,
    current: Option<Block>,
    last_was_blank: bool,
}

impl LineMachine {
    fn feed(&mut self, raw: &str) {
        let raw = raw.trim();
        if raw.is_empty() {
            self.last_was_blank = true;
            return;
        }
        let line = self.classify(raw);
        self.apply(line);
        self.last_was_blank = false;
    }

    fn classify(&self, raw: &str) -> Line {
        let stripped = strip_markdown(raw);

        if let Some(caps) = INLINE_ANSWER.captures(&stripped) {
            return Line::Answer(caps[1].trim().to_string());
        }
        if let Some(caps) = INLINE_EXPLANATION.captures(&stripped) {
            return Line::Explanation(caps[1].trim().to_string());
        }

        let bare_allowed = self.current.is_none() || self.last_was_blank;
        let start = NAMED_START
            .captures(&stripped)
            .or_else(|| Q_START.captures(&stripped))
            .or_else(|| HASH_START.captures(&stripped))
            .or_else(|| {
                bare_allowed
                    .then(|| BARE_START.captures(&stripped))
                    .flatten()
            });
        if let Some(caps) = start {
            return Line::QuestionStart {
                number: canonical_number(&caps[1]),
                rest: caps.get(2).map(|m| m.as_str().trim()).unwrap_or("").to_string(),
            };
        }

        if self.current.is_some() {
            if let Some(choice) = parse_choice_line(raw).or_else(|| parse_choice_line(&stripped)) {
                return Line::Choice(choice);
            }
        }

        if DIVIDER.is_match(&stripped) {
            return Line::Ignored;
        }
        if is_heading(raw, &stripped) {
            let leading = self.current.is_none() && self.committed.is_empty();
            if leading && MARKDOWN_HEADING.is_match(raw) && !stripped.is_empty() {
                return Line::Title(stripped);
            }
            return Line::Ignored;
        }

        Line::Text(stripped)
    }

    fn apply(&mut self, line: Line) {
        match line {
            Line::Answer(rest) => {
                let block = self.open();
                if !rest.is_empty() {
                    block.answer = Some(rest);
                }
            }
            Line::Explanation(rest) => {
                let block = self.open();
                if !rest.is_empty() {
                    block.explanation.push(rest);
                }
            }
            Line::QuestionStart { number, rest } => {
                self.commit();
                let mut block = Block {
                    id: Some(format!("Q{number}")),
                    ..Block::default()
                };
                if !rest.is_empty() {
                    block.prompt.push(rest);
                }
                self.current = Some(block);
            }
            Line::Choice(choice) => {
                if let Some(block) = self.current.as_mut() {
                    block.choices.push(choice.text);
                    block.labels.push(choice.label);
                }
            }
            Line::Title(text) => {
                self.title.get_or_insert(text);
            }
            Line::Ignored => {}
            Line::Text(text) => match self.current.as_mut() {
                None => {
                    self.current = Some(Block {
                        prompt: vec![text],
                        ..Block::default()
                    })
                }
                Some(block) if !block.explanation.is_empty() => block.explanation.push(text),
                Some(block) => match block.choices.last_mut() {
                    Some(last) => {
                        last.push(' ');
                        last.push_str(&text);
                    }
                    None => block.prompt.push(text),
                },
            },
        }
    }

    fn open(&mut self) -> &mut Block {
        self.current.get_or_insert_with(Block::default)
    }

    fn commit(&mut self) {
        if let Some(block) = self.current.take() {
            self.committed.push(block);
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.commit();
        self.committed
    }
}

fn finalize(block: Block, position: usize, key: &HashMap<String, KeyEntry>) -> Draft {
    let id = default_id(block.id.as_deref(), position);
    let entry = key.get(&id);

    let prompt = block.prompt.join("\n").trim().to_string();
    let explanation = non_blank(&block.explanation.join("\n"))
        .or_else(|| entry.and_then(|e| e.explanation.clone()));
    let raw_answer = block
        .answer
        .or_else(|| entry.map(|e| e.answer.clone()))
        .unwrap_or_default();

    let choices: Vec<String> = block.choices.iter().map(|c| collapse_whitespace(c)).collect();
    let choice_labels = block.labels.iter().any(Option::is_some).then(|| {
        block
            .labels
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect()
    });

    let kind = guess_type(&choices, &raw_answer);
    let answer = resolve_text_answer(kind, &raw_answer, &choices);

    Draft {
        id,
        prompt,
        choices,
        choice_labels,
        answer,
        explanation,
    }
}

/// Parse free-form exam text into the canonical model.
pub fn parse_text(text: &str, options: &ParseOptions) -> Parsed {
    let lines: Vec<&str> = text.lines().collect();

    let split = lines.iter().position(|line| is_answer_key_header(line));
    let (question_lines, key) = match split {
        Some(at) => {
            tracing::debug!(line = at + 1, "answer key section found");
            (
                &lines[..at],
                parse_answer_key(&lines[at + 1..], options.short_answer_max_chars),
            )
        }
        None => (&lines[..], HashMap::new()),
    };

    let mut machine = LineMachine::default();
    for line in question_lines {
        machine.feed(line);
    }
    let title = machine.title.take();
    let blocks = machine.finish();

    if blocks.is_empty() {
        return Parsed::failed("no questions found");
    }

    let drafts = blocks
        .into_iter()
        .enumerate()
        .map(|(position, block)| finalize(block, position, &key))
        .collect();

    let mut issues: Vec<ParseIssue> = Vec::new();
    let title = title.unwrap_or_else(|| options.default_title.clone());
    let exam = assemble_exam(title, drafts, options, &mut issues);
    Parsed {
        exam: Some(exam),
        issues,
    }
}
