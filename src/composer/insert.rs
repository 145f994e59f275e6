//! Splicing a chosen candidate into the composer text.

use serde::{Deserialize, Serialize};

use super::trigger::{clamp_caret, detect_trigger, TriggerKind};

/// Draft text and caret, in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerState {
    pub text: String,
    pub caret: usize,
}

impl ComposerState {
    pub fn new(text: impl Into<String>, caret: usize) -> Self {
        let text = text.into();
        let caret = clamp_caret(&text, caret);
        Self { text, caret }
    }

    /// State with the caret at the end of `text`.
    pub fn at_end(text: impl Into<String>) -> Self {
        let text = text.into();
        let caret = text.len();
        Self { text, caret }
    }
}

/// Replace the trigger ending at the caret with `sigil + insert_value + " "`.
///
/// The caret lands right after the trailing space. When no trigger of `kind`
/// ends at the caret the state is returned unchanged.
pub fn insert_candidate(state: &ComposerState, kind: TriggerKind, insert_value: &str) -> ComposerState {
    let caret = clamp_caret(&state.text, state.caret);
    let Some(trigger) = detect_trigger(&state.text, caret).filter(|t| t.kind == kind) else {
        return ComposerState {
            text: state.text.clone(),
            caret,
        };
    };

    let before = &state.text[..trigger.start];
    let after = &state.text[caret..];

    let mut text = String::with_capacity(state.text.len() + insert_value.len() + 2);
    text.push_str(before);
    text.push(kind.sigil());
    text.push_str(insert_value);
    text.push(' ');
    let caret = text.len();
    text.push_str(after);

    ComposerState { text, caret }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mention_insertion_moves_caret_past_space() {
        let state = ComposerState::at_end("hi @al");
        let next = insert_candidate(&state, TriggerKind::Mention, "alex");
        assert_eq!(next.text, "hi @alex ");
        assert_eq!(next.caret, 9);
    }

    #[test]
    fn empty_query_insertion() {
        let state = ComposerState::at_end("@");
        let next = insert_candidate(&state, TriggerKind::Mention, "sam");
        assert_eq!(next.text, "@sam ");
        assert_eq!(next.caret, 5);
    }

    #[test]
    fn text_after_caret_is_preserved() {
        let state = ComposerState::new("see #ru today", 7);
        let next = insert_candidate(&state, TriggerKind::Hashtag, "rustlang");
        assert_eq!(next.text, "see #rustlang  today");
        assert_eq!(next.caret, 14);
    }

    #[test]
    fn hashtag_does_not_touch_earlier_mention() {
        let state = ComposerState::at_end("thanks @alex for #ru");
        let next = insert_candidate(&state, TriggerKind::Hashtag, "rust");
        assert_eq!(next.text, "thanks @alex for #rust ");
        assert!(next.text.starts_with("thanks @alex "));
    }

    #[test]
    fn no_trigger_leaves_text_unchanged() {
        let state = ComposerState::at_end("nothing to complete");
        let next = insert_candidate(&state, TriggerKind::Mention, "alex");
        assert_eq!(next, state);
    }

    #[test]
    fn kind_mismatch_leaves_text_unchanged() {
        let state = ComposerState::at_end("hi @al");
        let next = insert_candidate(&state, TriggerKind::Hashtag, "alps");
        assert_eq!(next.text, "hi @al");
    }

    #[test]
    fn out_of_bounds_caret_is_clamped() {
        let state = ComposerState {
            text: "yo @ki".to_string(),
            caret: 99,
        };
        let next = insert_candidate(&state, TriggerKind::Mention, "kim");
        assert_eq!(next.text, "yo @kim ");
        assert_eq!(next.caret, 8);
    }
}
