//! Mention and hashtag completion language server.
//!
//! The server keeps one [`Composer`](composer::Composer) per open draft and
//! answers standard LSP completion, hover and semantic-token requests, plus
//! the `composer/*` custom requests a hosting UI uses to anchor its
//! suggestion panel and splice in the chosen candidate.

use std::sync::OnceLock;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::{Error as RpcError, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService};

pub mod composer;
pub mod directory;
mod document;
pub mod error;
mod lsp;
pub mod protocol;
pub mod session;
pub mod settings;
mod workspace;

pub use document::{ComposerDocument, DocumentStore, LineIndex};
pub use error::{Error, Result as CrateResult};
pub use lsp::{
    completion_items, completion_response, hover_for_token, legend, token_types, tokens_for_text,
};
pub use settings::{discover_settings, load_settings, Settings};
pub use workspace::Workspace;

use composer::{token_at, KeyOutcome, SuggestionItem, TriggerMatch};
use protocol::{
    ComposerEdit, KeyParams, KeyResult, SelectCandidateParams, TextChangeParams, TextChangeResult,
};
use session::{Session, SessionUser};

pub struct Backend {
    client: Client,
    documents: DocumentStore,
    workspace: OnceLock<Workspace>,
    session: RwLock<Session>,
}

impl Backend {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: DocumentStore::new(),
            workspace: OnceLock::new(),
            session: RwLock::new(Session::default()),
        }
    }

    pub(crate) fn with_workspace(client: Client, workspace: Workspace) -> Self {
        let session = Session::hydrate(workspace.session_store.as_ref());
        let backend = Self::new(client);
        let _ = backend.workspace.set(workspace);
        Self {
            session: RwLock::new(session),
            ..backend
        }
    }

    fn workspace(&self) -> &Workspace {
        self.workspace.get_or_init(Workspace::default)
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub async fn signed_in_user(&self) -> Option<SessionUser> {
        self.session.read().await.user().cloned()
    }

    /// Look up candidates for the document's active trigger.
    ///
    /// The document lock is released while the directory is queried. Returns
    /// None when there is no trigger or a newer lookup superseded this one.
    async fn resolve_suggestions(&self, uri: &Url) -> Option<(TriggerMatch, Vec<SuggestionItem>)> {
        let ticket = self
            .documents
            .with_document(uri, |doc| doc.composer.begin_lookup())
            .flatten()?;

        let signed_in = self.signed_in_user().await.map(|u| u.username);
        let result = directory::suggestions_for(
            self.workspace().directory.as_ref(),
            ticket.kind,
            &ticket.query,
            signed_in.as_deref(),
        )
        .await;

        self.documents
            .with_document(uri, |doc| {
                let items = doc.composer.apply_lookup(&ticket, result)?.items().to_vec();
                let trigger = doc.composer.trigger()?.clone();
                Some((trigger, items))
            })
            .flatten()
    }

    /// `composer/textChange`: record the draft and caret, detect a trigger and
    /// resolve its candidates.
    pub async fn text_change(&self, params: TextChangeParams) -> Result<Option<TextChangeResult>> {
        let uri = params.text_document.uri;
        let change = self.documents.with_document_or_open(
            uri.clone(),
            || self.workspace().composer(),
            |doc| {
                doc.text_change(params.text, params.caret, params.layout.as_ref())
                    .map(|change| {
                        let range = doc.line_index.span_to_range(&change.trigger.range());
                        (change, range)
                    })
            },
        );
        let Some((change, range)) = change else {
            return Ok(None);
        };

        let candidates = self.resolve_suggestions(&uri).await.map(|(_, items)| items);
        Ok(Some(TextChangeResult {
            kind: change.trigger.kind,
            query: change.trigger.query,
            range,
            anchor: change.anchor,
            candidates,
        }))
    }

    /// `composer/selectCandidate`: insert the candidate and report the caret.
    pub async fn select_candidate(&self, params: SelectCandidateParams) -> Result<ComposerEdit> {
        let uri = params.text_document.uri;
        self.documents
            .with_document(&uri, |doc| {
                let state = doc.composer.on_candidate_selected(&params.candidate);
                let caret = doc.adopt(&state);
                ComposerEdit {
                    text: state.text,
                    caret,
                }
            })
            .ok_or_else(|| unknown_document(&uri))
    }

    /// `composer/key`: keyboard navigation inside the suggestion panel.
    pub async fn key(&self, params: KeyParams) -> Result<KeyResult> {
        let uri = params.text_document.uri;
        self.documents
            .with_document(&uri, |doc| match doc.composer.handle_key(params.key) {
                KeyOutcome::Moved { highlighted } => KeyResult::Moved { highlighted },
                KeyOutcome::Committed(state) => {
                    let caret = doc.adopt(&state);
                    KeyResult::Committed {
                        text: state.text,
                        caret,
                    }
                }
                KeyOutcome::Dismissed => KeyResult::Dismissed,
                KeyOutcome::Ignored => KeyResult::Ignored,
            })
            .ok_or_else(|| unknown_document(&uri))
    }

    async fn login(&self, arguments: Vec<serde_json::Value>) -> CrateResult<()> {
        let argument = arguments.into_iter().next().unwrap_or_default();
        let user: SessionUser = serde_json::from_value(argument)?;
        tracing::info!(username = %user.username, "signing in");
        let store = self.workspace().session_store.clone();
        self.session.write().await.login(store.as_ref(), user)?;
        Ok(())
    }

    async fn logout(&self) -> CrateResult<()> {
        tracing::info!("signing out");
        let store = self.workspace().session_store.clone();
        self.session.write().await.logout(store.as_ref())?;
        Ok(())
    }
}

fn unknown_document(uri: &Url) -> RpcError {
    RpcError::invalid_params(format!("no open composer for {}", uri))
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let workspace_root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|f| f.uri.to_file_path().ok())
            .or_else(|| {
                #[allow(deprecated)]
                params.root_uri.as_ref()?.to_file_path().ok()
            });

        if let Some(root) = workspace_root {
            tracing::info!(root = %root.display(), "initializing workspace");

            let (settings, settings_dir) = settings::discover_settings(&root);
            let workspace = Workspace::from_settings(&settings, &settings_dir);
            if self.workspace.set(workspace).is_err() {
                tracing::debug!("workspace already configured, ignoring discovered settings");
            }
        }

        let session = Session::hydrate(self.workspace().session_store.as_ref());
        *self.session.write().await = session;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec!["@".to_string(), "#".to_string()]),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                semantic_tokens_provider: Some(
                    SemanticTokensServerCapabilities::SemanticTokensOptions(
                        SemanticTokensOptions {
                            legend: lsp::legend(),
                            full: Some(SemanticTokensFullOptions::Bool(true)),
                            range: None,
                            work_done_progress_options: WorkDoneProgressOptions::default(),
                        },
                    ),
                ),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![
                        protocol::LOGIN_COMMAND.to_string(),
                        protocol::LOGOUT_COMMAND.to_string(),
                    ],
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "mention language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.documents.open(
            params.text_document.uri,
            params.text_document.text,
            Some(params.text_document.version),
            || self.workspace().composer(),
        );
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // FULL sync: exactly one change carrying the whole text
        if let Some(change) = params.content_changes.into_iter().next() {
            self.documents.open(
                params.text_document.uri,
                change.text,
                Some(params.text_document.version),
                || self.workspace().composer(),
            );
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.close(&params.text_document.uri);
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let Some(detected) = self
            .documents
            .with_document(uri, |doc| doc.move_caret(position))
        else {
            tracing::debug!(%uri, "completion for unknown document");
            return Ok(None);
        };
        if detected.is_none() {
            return Ok(None);
        }

        let Some((trigger, items)) = self.resolve_suggestions(uri).await else {
            return Ok(None);
        };
        let Some(line_index) = self.documents.line_index(uri) else {
            return Ok(None);
        };
        Ok(lsp::completion_response(&line_index, &trigger, &items))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(line_index) = self.documents.line_index(uri) else {
            return Ok(None);
        };
        let Some(offset) = line_index.position_to_offset(position) else {
            return Ok(None);
        };
        let Some(token) = token_at(line_index.source(), offset) else {
            return Ok(None);
        };

        match lsp::hover_for_token(self.workspace().directory.as_ref(), &line_index, &token).await {
            Ok(hover) => Ok(hover),
            Err(e) => {
                tracing::warn!(error = %e, token = %token.value, "hover lookup failed");
                Ok(None)
            }
        }
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        let Some(line_index) = self.documents.line_index(&params.text_document.uri) else {
            return Ok(None);
        };

        Ok(Some(SemanticTokensResult::Tokens(SemanticTokens {
            result_id: None,
            data: lsp::tokens_for_text(&line_index),
        })))
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> Result<Option<serde_json::Value>> {
        let outcome = match params.command.as_str() {
            protocol::LOGIN_COMMAND => self.login(params.arguments).await,
            protocol::LOGOUT_COMMAND => self.logout().await,
            other => {
                return Err(RpcError::invalid_params(format!("unknown command '{}'", other)));
            }
        };
        outcome
            .map(|()| None)
            .map_err(|e| RpcError::invalid_params(e.to_string()))
    }
}

fn build_service(
    builder: tower_lsp::LspServiceBuilder<Backend>,
) -> (LspService<Backend>, tower_lsp::ClientSocket) {
    builder
        .custom_method(protocol::TEXT_CHANGE, Backend::text_change)
        .custom_method(protocol::SELECT_CANDIDATE, Backend::select_candidate)
        .custom_method(protocol::KEY, Backend::key)
        .finish()
}

/// Service whose workspace is configured from settings at `initialize`.
pub fn create_service() -> (LspService<Backend>, tower_lsp::ClientSocket) {
    build_service(LspService::build(Backend::new))
}

/// Service around a preconfigured workspace.
pub fn create_service_with(workspace: Workspace) -> (LspService<Backend>, tower_lsp::ClientSocket) {
    build_service(LspService::build(move |client| {
        Backend::with_workspace(client, workspace)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_can_be_created() {
        let (_service, _socket) = create_service();
    }
}
