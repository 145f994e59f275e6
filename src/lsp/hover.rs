//! Hover information for completed mentions and hashtags.

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind};

use crate::composer::{Token, TriggerKind};
use crate::directory::{Directory, TagCandidate, UserCandidate};
use crate::document::LineIndex;
use crate::error::Result;

fn format_user(user: &UserCandidate) -> String {
    format!("**{}**  \n@{}\n\n![avatar]({})", user.name, user.username, user.avatar)
}

fn format_tag(tag: &TagCandidate) -> String {
    let posts = if tag.post_count == 1 { "post" } else { "posts" };
    format!("**#{}**\n\n{} {}", tag.name, tag.post_count, posts)
}

fn markdown_hover(value: String, line_index: &LineIndex, token: &Token) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: Some(line_index.span_to_range(&token.span)),
    }
}

/// Look up the directory record behind `token`.
///
/// Returns `Ok(None)` for tokens the directory does not know.
pub async fn hover_for_token(
    directory: &dyn Directory,
    line_index: &LineIndex,
    token: &Token,
) -> Result<Option<Hover>> {
    let markdown = match token.kind {
        TriggerKind::Mention => directory
            .lookup_user(&token.value)
            .await?
            .map(|u| format_user(&u)),
        TriggerKind::Hashtag => directory
            .lookup_tag(&token.value)
            .await?
            .map(|t| format_tag(&t)),
    };
    Ok(markdown.map(|value| markdown_hover(value, line_index, token)))
}
