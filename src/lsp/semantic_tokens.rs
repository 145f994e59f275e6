//! Semantic tokens for mention and hashtag highlighting.

use tower_lsp::lsp_types::{SemanticToken, SemanticTokenType, SemanticTokensLegend};

use crate::composer::{scan_tokens, TriggerKind};
use crate::document::{utf16_len, LineIndex};

/// Token type indices (must match LEGEND order).
pub mod token_types {
    pub const MENTION: u32 = 0;
    pub const HASHTAG: u32 = 1;
}

/// Get the semantic tokens legend for capability declaration.
pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: vec![SemanticTokenType::VARIABLE, SemanticTokenType::KEYWORD],
        token_modifiers: vec![],
    }
}

/// Delta-encoded tokens for every completed mention and hashtag.
pub fn tokens_for_text(line_index: &LineIndex) -> Vec<SemanticToken> {
    let source = line_index.source();
    let mut result = Vec::new();
    let mut prev_line = 0u32;
    let mut prev_start = 0u32;

    for token in scan_tokens(source) {
        let pos = line_index.offset_to_position(token.span.start);
        let delta_line = pos.line - prev_line;
        let delta_start = if delta_line == 0 {
            pos.character - prev_start
        } else {
            pos.character
        };
        let token_type = match token.kind {
            TriggerKind::Mention => token_types::MENTION,
            TriggerKind::Hashtag => token_types::HASHTAG,
        };

        result.push(SemanticToken {
            delta_line,
            delta_start,
            length: utf16_len(&source[token.span.clone()]),
            token_type,
            token_modifiers_bitset: 0,
        });

        prev_line = pos.line;
        prev_start = pos.character;
    }

    result
}
