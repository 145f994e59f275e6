//! Wire types for the `composer/*` custom requests.

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{Position, Range, TextDocumentIdentifier};

use crate::composer::{AnchorPosition, FieldLayout, NavigationKey, SuggestionItem, TriggerKind};

pub const TEXT_CHANGE: &str = "composer/textChange";
pub const SELECT_CANDIDATE: &str = "composer/selectCandidate";
pub const KEY: &str = "composer/key";

pub const LOGIN_COMMAND: &str = "mentionsp.login";
pub const LOGOUT_COMMAND: &str = "mentionsp.logout";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChangeParams {
    pub text_document: TextDocumentIdentifier,
    pub text: String,
    pub caret: Position,
    #[serde(default)]
    pub layout: Option<FieldLayout>,
}

/// Active trigger after a text change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChangeResult {
    pub kind: TriggerKind,
    pub query: String,
    /// Range of the sigil and query.
    pub range: Range,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<AnchorPosition>,
    /// `None` when a newer text change superseded this lookup.
    pub candidates: Option<Vec<SuggestionItem>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectCandidateParams {
    pub text_document: TextDocumentIdentifier,
    pub candidate: SuggestionItem,
}

/// Draft after an insertion, with the caret to restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerEdit {
    pub text: String,
    pub caret: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyParams {
    pub text_document: TextDocumentIdentifier,
    pub key: NavigationKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum KeyResult {
    Moved { highlighted: usize },
    Committed { text: String, caret: Position },
    Dismissed,
    Ignored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_result_is_tagged() {
        let json = serde_json::to_value(KeyResult::Moved { highlighted: 2 }).unwrap();
        assert_eq!(json, serde_json::json!({ "outcome": "moved", "highlighted": 2 }));
        let json = serde_json::to_value(KeyResult::Dismissed).unwrap();
        assert_eq!(json, serde_json::json!({ "outcome": "dismissed" }));
    }

    #[test]
    fn text_change_params_accept_missing_layout() {
        let params: TextChangeParams = serde_json::from_value(serde_json::json!({
            "textDocument": { "uri": "composer://post/1" },
            "text": "@a",
            "caret": { "line": 0, "character": 2 }
        }))
        .unwrap();
        assert!(params.layout.is_none());
    }

    #[test]
    fn layout_uses_camel_case() {
        let params: TextChangeParams = serde_json::from_value(serde_json::json!({
            "textDocument": { "uri": "composer://post/1" },
            "text": "@a",
            "caret": { "line": 0, "character": 2 },
            "layout": {
                "top": 1.0, "left": 2.0, "width": 300.0, "height": 80.0,
                "fontSize": 14.0, "lineHeight": 20.0, "viewportHeight": 700.0
            }
        }))
        .unwrap();
        let layout = params.layout.unwrap();
        assert_eq!(layout.font_size, 14.0);
        assert_eq!(layout.scroll_top, 0.0);
    }
}
