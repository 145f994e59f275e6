//! Trigger detection for `@mention` and `#hashtag` autocompletion.
//!
//! Only the text immediately before the caret is inspected. A trigger is an
//! unterminated `@word` or `#word` suffix whose sigil sits at the start of the
//! text or right after whitespace, so `foo@bar` and e-mail addresses never
//! open the suggestion panel.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Suffix pattern: optional boundary, sigil, then any run of word characters.
static TRIGGER_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)([@#])(\w*)$").expect("valid trigger regex"));

/// Completed tokens anywhere in a text.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)([@#])(\w+)").expect("valid token regex"));

/// Which suggestion source a trigger draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Mention,
    Hashtag,
}

impl TriggerKind {
    /// The sigil that opens this kind of trigger.
    pub fn sigil(self) -> char {
        match self {
            TriggerKind::Mention => '@',
            TriggerKind::Hashtag => '#',
        }
    }

    fn from_sigil(sigil: &str) -> Option<Self> {
        match sigil {
            "@" => Some(TriggerKind::Mention),
            "#" => Some(TriggerKind::Hashtag),
            _ => None,
        }
    }
}

/// An active trigger ending at the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMatch {
    pub kind: TriggerKind,
    /// Word characters typed after the sigil (may be empty).
    pub query: String,
    /// Byte offset of the sigil.
    pub start: usize,
}

impl TriggerMatch {
    /// Byte range covered by the sigil and query.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + 1 + self.query.len()
    }
}

/// A completed `@word` or `#word` token somewhere in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TriggerKind,
    /// The word without its sigil.
    pub value: String,
    /// Byte range including the sigil.
    pub span: std::ops::Range<usize>,
}

/// Clamp a caret offset into `0..=text.len()` and onto a char boundary.
pub fn clamp_caret(text: &str, caret: usize) -> usize {
    let mut caret = caret.min(text.len());
    while !text.is_char_boundary(caret) {
        caret -= 1;
    }
    caret
}

/// Detect the trigger that ends at `caret`, if any.
pub fn detect_trigger(text: &str, caret: usize) -> Option<TriggerMatch> {
    let caret = clamp_caret(text, caret);
    let before = &text[..caret];

    let captures = TRIGGER_SUFFIX.captures(before)?;
    let sigil = captures.get(1)?;
    let query = captures.get(2)?;

    Some(TriggerMatch {
        kind: TriggerKind::from_sigil(sigil.as_str())?,
        query: query.as_str().to_string(),
        start: sigil.start(),
    })
}

/// Find every completed token in `text`, in order of appearance.
pub fn scan_tokens(text: &str) -> Vec<Token> {
    // The boundary is consumed by each match, so adjacent tokens separated by
    // a single space are found by restarting the search at the sigil.
    let mut tokens = Vec::new();
    let mut from = 0;
    while let Some(captures) = TOKEN.captures_at(text, from) {
        let (Some(sigil), Some(word)) = (captures.get(1), captures.get(2)) else {
            break;
        };
        if let Some(kind) = TriggerKind::from_sigil(sigil.as_str()) {
            tokens.push(Token {
                kind,
                value: word.as_str().to_string(),
                span: sigil.start()..word.end(),
            });
        }
        from = word.end();
    }
    tokens
}

/// Find the completed token whose span contains `offset`.
pub fn token_at(text: &str, offset: usize) -> Option<Token> {
    scan_tokens(text)
        .into_iter()
        .find(|t| t.span.start <= offset && offset <= t.span.end)
}
