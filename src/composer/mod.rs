//! Mention and hashtag autocompletion for a single composer.
//!
//! This module provides:
//! - `trigger` detection of the `@word`/`#word` suffix before the caret
//! - `anchor` and `mirror` for placing the suggestion panel on screen
//! - `panel` for candidate lists and keyboard navigation
//! - `insert` for splicing the chosen candidate into the draft
//!
//! [`Composer`] ties these together into a small state machine:
//! `Idle → Detecting → Resolved → Idle`. Lookups are asynchronous and run
//! outside the composer; a [`LookupTicket`] makes sure only the newest one
//! is ever applied.

mod anchor;
mod insert;
mod mirror;
mod panel;
mod trigger;

pub use anchor::{
    estimate_anchor, measure_anchor, AnchorEstimator, AnchorMetrics, AnchorPosition, FieldLayout,
    Padding,
};
pub use insert::{insert_candidate, ComposerState};
pub use mirror::{
    MarkerRect, MeasureError, MirrorGuard, MirrorHandle, MirrorHost, MirrorStyle, MonospaceMirror,
    UnavailableMirror,
};
pub use panel::{NavigationKey, PanelAction, SuggestionItem, SuggestionPanel};
pub use trigger::{clamp_caret, detect_trigger, scan_tokens, token_at, Token, TriggerKind, TriggerMatch};

use crate::directory;

const DEFAULT_MAX_SUGGESTIONS: usize = 8;

/// Result of a text change while a trigger is active.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChange {
    pub trigger: TriggerMatch,
    /// Present when the host supplied its field layout.
    pub anchor: Option<AnchorPosition>,
}

/// Identifies one in-flight lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    generation: u64,
    pub kind: TriggerKind,
    pub query: String,
}

/// What a key press did to the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Moved { highlighted: usize },
    Committed(ComposerState),
    Dismissed,
    Ignored,
}

#[derive(Debug, Clone, Default)]
enum Phase {
    #[default]
    Idle,
    Detecting(TriggerMatch),
    Resolved {
        trigger: TriggerMatch,
        panel: SuggestionPanel,
    },
}

impl Phase {
    fn trigger(&self) -> Option<&TriggerMatch> {
        match self {
            Phase::Idle => None,
            Phase::Detecting(trigger) | Phase::Resolved { trigger, .. } => Some(trigger),
        }
    }
}

/// Autocomplete state for one draft.
#[derive(Debug, Clone)]
pub struct Composer {
    state: ComposerState,
    phase: Phase,
    generation: u64,
    max_suggestions: usize,
    estimator: AnchorEstimator,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(AnchorEstimator::default(), DEFAULT_MAX_SUGGESTIONS)
    }
}

impl Composer {
    pub fn new(estimator: AnchorEstimator, max_suggestions: usize) -> Self {
        Self {
            state: ComposerState::default(),
            phase: Phase::Idle,
            generation: 0,
            max_suggestions,
            estimator,
        }
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    /// The active trigger, if any. There is never more than one.
    pub fn trigger(&self) -> Option<&TriggerMatch> {
        self.phase.trigger()
    }

    pub fn panel(&self) -> Option<&SuggestionPanel> {
        match &self.phase {
            Phase::Resolved { panel, .. } => Some(panel),
            _ => None,
        }
    }

    /// Replace the text without a caret update, as a full-document sync does.
    ///
    /// The caret is clamped into the new text and any open panel is closed.
    pub fn sync_text(&mut self, text: String) {
        let caret = clamp_caret(&text, self.state.caret);
        self.state = ComposerState { text, caret };
        self.phase = Phase::Idle;
    }

    /// Record new text and caret, and detect a trigger at the caret.
    pub fn on_text_change(&mut self, text: String, caret: usize, layout: Option<&FieldLayout>) -> Option<TextChange> {
        self.state = ComposerState::new(text, caret);

        let Some(trigger) = detect_trigger(&self.state.text, self.state.caret) else {
            self.phase = Phase::Idle;
            return None;
        };

        let anchor = layout.map(|l| self.estimator.anchor(l, &self.state.text[..self.state.caret]));
        tracing::trace!(kind = ?trigger.kind, query = %trigger.query, "trigger detected");
        self.phase = Phase::Detecting(trigger.clone());

        Some(TextChange { trigger, anchor })
    }

    /// Start a lookup for the active trigger.
    ///
    /// Every call supersedes tickets handed out earlier.
    pub fn begin_lookup(&mut self) -> Option<LookupTicket> {
        let trigger = self.phase.trigger()?;
        self.generation += 1;
        Some(LookupTicket {
            generation: self.generation,
            kind: trigger.kind,
            query: trigger.query.clone(),
        })
    }

    /// Apply lookup results if `ticket` is still the newest lookup for the
    /// active trigger.
    ///
    /// Returns `None` when the result was discarded. A failed lookup yields an
    /// empty panel.
    pub fn apply_lookup(
        &mut self,
        ticket: &LookupTicket,
        result: directory::Result<Vec<SuggestionItem>>,
    ) -> Option<&SuggestionPanel> {
        if ticket.generation != self.generation {
            tracing::debug!(query = %ticket.query, "discarding superseded lookup");
            return None;
        }
        let trigger = self
            .phase
            .trigger()
            .filter(|t| t.kind == ticket.kind && t.query == ticket.query)?
            .clone();

        let mut items = match result {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, query = %ticket.query, "suggestion lookup failed");
                Vec::new()
            }
        };
        items.truncate(self.max_suggestions);
        if items.is_empty() && trigger.kind == TriggerKind::Hashtag && !trigger.query.is_empty() {
            items.push(SuggestionItem::create_tag(&trigger.query));
        }

        self.phase = Phase::Resolved {
            trigger,
            panel: SuggestionPanel::new(items),
        };
        self.panel()
    }

    /// Insert `candidate` in place of the active trigger and return to idle.
    pub fn on_candidate_selected(&mut self, candidate: &SuggestionItem) -> ComposerState {
        let kind = self
            .phase
            .trigger()
            .map(|t| t.kind)
            .or_else(|| detect_trigger(&self.state.text, self.state.caret).map(|t| t.kind));

        if let Some(kind) = kind {
            self.state = insert_candidate(&self.state, kind, &candidate.insert_value);
        }
        self.phase = Phase::Idle;
        self.state.clone()
    }

    /// Route a navigation key to the panel.
    pub fn handle_key(&mut self, key: NavigationKey) -> KeyOutcome {
        let action = match &mut self.phase {
            Phase::Resolved { panel, .. } => panel.handle_key(key),
            Phase::Detecting(_) if matches!(key, NavigationKey::Escape | NavigationKey::Blur) => {
                PanelAction::Dismiss
            }
            _ => PanelAction::Ignored,
        };

        match action {
            PanelAction::Moved(highlighted) => KeyOutcome::Moved { highlighted },
            PanelAction::Commit(item) => KeyOutcome::Committed(self.on_candidate_selected(&item)),
            PanelAction::Dismiss => {
                self.dismiss();
                KeyOutcome::Dismissed
            }
            PanelAction::Ignored => KeyOutcome::Ignored,
        }
    }

    /// Close the panel without touching the text.
    pub fn dismiss(&mut self) {
        self.phase = Phase::Idle;
    }
}
