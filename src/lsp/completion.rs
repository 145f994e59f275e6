//! Completion items for `@mention` and `#hashtag` triggers.
//!
//! Each item carries a `textEdit` that replaces the sigil and partial query
//! with the full token plus a trailing space, so accepting an item leaves the
//! caret ready for the next word.

use tower_lsp::lsp_types::*;

use crate::composer::{SuggestionItem, TriggerKind, TriggerMatch};
use crate::document::LineIndex;

fn item_kind(kind: TriggerKind) -> CompletionItemKind {
    match kind {
        TriggerKind::Mention => CompletionItemKind::REFERENCE,
        TriggerKind::Hashtag => CompletionItemKind::VALUE,
    }
}

/// Build one completion item per suggestion, keeping directory order.
pub fn completion_items(
    line_index: &LineIndex,
    trigger: &TriggerMatch,
    suggestions: &[SuggestionItem],
) -> Vec<CompletionItem> {
    let range = line_index.span_to_range(&trigger.range());
    let sigil = trigger.kind.sigil();

    suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let token = format!("{}{}", sigil, s.insert_value);
            CompletionItem {
                label: s.display_label.clone(),
                kind: Some(item_kind(trigger.kind)),
                detail: s.detail.clone(),
                filter_text: Some(token.clone()),
                sort_text: Some(format!("{:04}", i)),
                preselect: Some(i == 0),
                text_edit: Some(CompletionTextEdit::Edit(TextEdit {
                    range,
                    new_text: format!("{} ", token),
                })),
                ..Default::default()
            }
        })
        .collect()
}

/// Wrap suggestions in a completion list.
///
/// The list is marked incomplete so clients ask again as the query grows.
pub fn completion_response(
    line_index: &LineIndex,
    trigger: &TriggerMatch,
    suggestions: &[SuggestionItem],
) -> Option<CompletionResponse> {
    let items = completion_items(line_index, trigger, suggestions);
    if items.is_empty() {
        None
    } else {
        Some(CompletionResponse::List(CompletionList {
            is_incomplete: true,
            items,
        }))
    }
}
