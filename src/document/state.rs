//! Document state management for open composers.

use dashmap::DashMap;
use tower_lsp::lsp_types::{Position, Url};

use crate::composer::{Composer, ComposerState, FieldLayout, TextChange};

use super::text::LineIndex;

/// One open draft: its text index and autocomplete state.
#[derive(Debug, Clone)]
pub struct ComposerDocument {
    pub line_index: LineIndex,
    pub composer: Composer,
    /// Document version from the client, when synced through LSP.
    pub version: Option<i32>,
}

impl ComposerDocument {
    pub fn new(composer: Composer) -> Self {
        Self {
            line_index: LineIndex::default(),
            composer,
            version: None,
        }
    }

    /// Full-document sync without caret information.
    pub fn sync(&mut self, text: String, version: Option<i32>) {
        self.line_index = LineIndex::new(text.clone());
        self.composer.sync_text(text);
        self.version = version;
    }

    /// Text change from the hosting UI, with the caret as an LSP position.
    pub fn text_change(
        &mut self,
        text: String,
        caret: Position,
        layout: Option<&FieldLayout>,
    ) -> Option<TextChange> {
        self.line_index = LineIndex::new(text.clone());
        let offset = self.line_index.caret_offset(caret);
        self.composer.on_text_change(text, offset, layout)
    }

    /// Re-run detection at `caret` on the current text.
    pub fn move_caret(&mut self, caret: Position) -> Option<TextChange> {
        let text = self.line_index.source().to_string();
        let offset = self.line_index.caret_offset(caret);
        self.composer.on_text_change(text, offset, None)
    }

    /// Adopt a composer state produced by an insertion.
    pub fn adopt(&mut self, state: &ComposerState) -> Position {
        if state.text != self.line_index.source() {
            self.line_index = LineIndex::new(state.text.clone());
        }
        self.line_index.offset_to_position(state.caret)
    }
}

/// Thread-safe storage for open drafts.
///
/// Access goes through closures so no entry lock can be held across an
/// `.await`.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, ComposerDocument>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Open a document, or resync it if it is already open.
    pub fn open(&self, uri: Url, text: String, version: Option<i32>, composer: impl FnOnce() -> Composer) {
        self.documents
            .entry(uri)
            .or_insert_with(|| ComposerDocument::new(composer()))
            .sync(text, version);
    }

    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.documents.contains_key(uri)
    }

    /// Run `f` against the document, returning None if it is not open.
    pub fn with_document<R>(&self, uri: &Url, f: impl FnOnce(&mut ComposerDocument) -> R) -> Option<R> {
        self.documents.get_mut(uri).map(|mut doc| f(&mut doc))
    }

    /// Like [`with_document`](Self::with_document), opening an empty
    /// document first when needed.
    pub fn with_document_or_open<R>(
        &self,
        uri: Url,
        composer: impl FnOnce() -> Composer,
        f: impl FnOnce(&mut ComposerDocument) -> R,
    ) -> R {
        let mut doc = self
            .documents
            .entry(uri)
            .or_insert_with(|| ComposerDocument::new(composer()));
        f(&mut doc)
    }

    pub fn text(&self, uri: &Url) -> Option<String> {
        self.documents
            .get(uri)
            .map(|doc| doc.line_index.source().to_string())
    }

    pub fn line_index(&self, uri: &Url) -> Option<LineIndex> {
        self.documents.get(uri).map(|doc| doc.line_index.clone())
    }
}
