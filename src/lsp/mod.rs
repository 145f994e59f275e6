//! LSP protocol feature implementations.
//!
//! This module provides implementations for LSP features:
//! - Completion items for active mention/hashtag triggers
//! - Hover information for completed tokens
//! - Semantic tokens for mention/hashtag highlighting

mod completion;
mod hover;
mod semantic_tokens;

pub use completion::{completion_items, completion_response};
pub use hover::hover_for_token;
pub use semantic_tokens::{legend, token_types, tokens_for_text};
