//! Choice-line grammar.
//!
//! Shared by the plain-text parser and the editable transcoder so both read
//! choice syntax identically.

use once_cell::sync::Lazy;
use regex::Regex;

static CIRCLED_CHOICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([①-⑩])\s*(\S.*)$").expect("circled choice pattern is valid"));

static NUMBERED_CHOICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})\s*[)\.]\s*(\S.*)$").expect("numbered choice pattern is valid")
});

static LETTERED_CHOICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z])\s*[)\.]\s*(\S.*)$").expect("lettered choice pattern is valid")
});

static BULLET_CHOICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-•·]\s+(\S.*)$").expect("bullet choice pattern is valid"));

/// A recognized choice line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceLine {
    /// `①`, `2`, `B`; `None` for bullets.
    pub label: Option<String>,
    pub text: String,
}

/// Recognize one line of choice text.
///
/// Tried in order: circled numeral, `N)`/`N.`, `A)`/`A.`, bullet.
pub fn parse_choice_line(line: &str) -> Option<ChoiceLine> {
    let line = line.trim();

    for pattern in [&*CIRCLED_CHOICE, &*NUMBERED_CHOICE, &*LETTERED_CHOICE] {
        if let Some(caps) = pattern.captures(line) {
            return Some(ChoiceLine {
                label: Some(caps[1].to_string()),
                text: caps[2].trim().to_string(),
            });
        }
    }

    BULLET_CHOICE.captures(line).map(|caps| ChoiceLine {
        label: None,
        text: caps[1].trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(line: &str) -> Option<(Option<String>, String)> {
        parse_choice_line(line).map(|c| (c.label, c.text))
    }

    #[test]
    fn circled() {
        assert_eq!(parsed("① 서울"), Some((Some("①".into()), "서울".into())));
        assert_eq!(parsed("②부산"), Some((Some("②".into()), "부산".into())));
    }

    #[test]
    fn numbered() {
        assert_eq!(parsed("1) apple"), Some((Some("1".into()), "apple".into())));
        assert_eq!(parsed("  12. pear  "), Some((Some("12".into()), "pear".into())));
    }

    #[test]
    fn lettered() {
        assert_eq!(parsed("A. red"), Some((Some("A".into()), "red".into())));
        assert_eq!(parsed("b) blue"), Some((Some("b".into()), "blue".into())));
    }

    #[test]
    fn bullets_have_no_label() {
        assert_eq!(parsed("- first"), Some((None, "first".into())));
        assert_eq!(parsed("• second"), Some((None, "second".into())));
    }

    #[test]
    fn non_choices() {
        assert_eq!(parsed("plain prose"), None);
        assert_eq!(parsed("---"), None);
        assert_eq!(parsed("1)"), None);
        assert_eq!(parsed("-5 degrees"), None);
        assert_eq!(parsed(""), None);
    }
}
