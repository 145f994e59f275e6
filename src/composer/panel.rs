//! Suggestion panel contents and keyboard navigation.

use serde::{Deserialize, Serialize};

/// One entry in the suggestion panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionItem {
    pub id: String,
    pub display_label: String,
    /// Text inserted after the sigil, without the trailing space.
    pub insert_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SuggestionItem {
    /// Synthetic entry offering to create a hashtag that does not exist yet.
    pub fn create_tag(query: &str) -> Self {
        Self {
            id: format!("new-tag:{query}"),
            display_label: format!("Create #{query}"),
            insert_value: query.to_string(),
            detail: Some("new tag".to_string()),
        }
    }
}

/// Keys the panel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationKey {
    Up,
    Down,
    Enter,
    Tab,
    Escape,
    /// The text field lost focus.
    Blur,
}

/// What a key press did to the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    Moved(usize),
    Commit(SuggestionItem),
    Dismiss,
    Ignored,
}

/// Candidates for the active trigger plus the highlighted row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionPanel {
    items: Vec<SuggestionItem>,
    highlighted: usize,
}

impl SuggestionPanel {
    pub fn new(items: Vec<SuggestionItem>) -> Self {
        Self {
            items,
            highlighted: 0,
        }
    }

    pub fn items(&self) -> &[SuggestionItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn highlighted(&self) -> Option<&SuggestionItem> {
        self.items.get(self.highlighted)
    }

    pub fn highlighted_index(&self) -> usize {
        self.highlighted
    }

    /// Apply a key press. Arrow keys wrap around both ends.
    pub fn handle_key(&mut self, key: NavigationKey) -> PanelAction {
        match key {
            NavigationKey::Escape | NavigationKey::Blur => PanelAction::Dismiss,
            _ if self.items.is_empty() => PanelAction::Ignored,
            NavigationKey::Down => {
                self.highlighted = (self.highlighted + 1) % self.items.len();
                PanelAction::Moved(self.highlighted)
            }
            NavigationKey::Up => {
                self.highlighted = self
                    .highlighted
                    .checked_sub(1)
                    .unwrap_or(self.items.len() - 1);
                PanelAction::Moved(self.highlighted)
            }
            NavigationKey::Enter | NavigationKey::Tab => match self.highlighted() {
                Some(item) => PanelAction::Commit(item.clone()),
                None => PanelAction::Ignored,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> SuggestionItem {
        SuggestionItem {
            id: name.to_string(),
            display_label: name.to_string(),
            insert_value: name.to_string(),
            detail: None,
        }
    }

    fn panel() -> SuggestionPanel {
        SuggestionPanel::new(vec![item("ada"), item("alan"), item("alex")])
    }

    #[test]
    fn down_wraps_to_first() {
        let mut p = panel();
        assert_eq!(p.handle_key(NavigationKey::Down), PanelAction::Moved(1));
        assert_eq!(p.handle_key(NavigationKey::Down), PanelAction::Moved(2));
        assert_eq!(p.handle_key(NavigationKey::Down), PanelAction::Moved(0));
    }

    #[test]
    fn up_wraps_to_last() {
        let mut p = panel();
        assert_eq!(p.handle_key(NavigationKey::Up), PanelAction::Moved(2));
        assert_eq!(p.highlighted().unwrap().insert_value, "alex");
    }

    #[test]
    fn enter_and_tab_commit_highlighted() {
        let mut p = panel();
        p.handle_key(NavigationKey::Down);
        assert_eq!(p.handle_key(NavigationKey::Enter), PanelAction::Commit(item("alan")));
        assert_eq!(p.handle_key(NavigationKey::Tab), PanelAction::Commit(item("alan")));
    }

    #[test]
    fn escape_and_blur_dismiss() {
        let mut p = panel();
        assert_eq!(p.handle_key(NavigationKey::Escape), PanelAction::Dismiss);
        assert_eq!(p.handle_key(NavigationKey::Blur), PanelAction::Dismiss);
    }

    #[test]
    fn empty_panel_ignores_navigation() {
        let mut p = SuggestionPanel::default();
        assert_eq!(p.handle_key(NavigationKey::Down), PanelAction::Ignored);
        assert_eq!(p.handle_key(NavigationKey::Enter), PanelAction::Ignored);
        assert_eq!(p.handle_key(NavigationKey::Escape), PanelAction::Dismiss);
    }

    #[test]
    fn create_tag_inserts_raw_query() {
        let tag = SuggestionItem::create_tag("rustconf");
        assert_eq!(tag.insert_value, "rustconf");
        assert_eq!(tag.display_label, "Create #rustconf");
    }
}
