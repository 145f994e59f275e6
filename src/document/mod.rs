//! Document state management and text utilities.
//!
//! This module provides:
//! - `LineIndex` for byte offset <-> LSP position conversion
//! - `ComposerDocument` and `DocumentStore` for draft lifecycle management

mod state;
mod text;

pub use state::{ComposerDocument, DocumentStore};
pub use text::{utf16_len, LineIndex};
