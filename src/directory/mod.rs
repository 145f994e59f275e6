//! Lookup collaborators for mention and hashtag candidates.
//!
//! The composer never talks to a data source directly; it goes through the
//! [`Directory`] trait so the in-process mock can be swapped for a networked
//! implementation without touching detection or insertion.

mod mock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::composer::{SuggestionItem, TriggerKind};

pub use mock::{Chat, ChatEntry, DummyUser, MockDirectory};

/// A user that can be mentioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCandidate {
    pub id: String,
    pub name: String,
    pub username: String,
    pub avatar: String,
}

/// A hashtag that can be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCandidate {
    pub id: String,
    pub name: String,
    pub post_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
    #[error("lookup for '{query}' failed: {reason}")]
    Lookup { query: String, reason: String },
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Source of mention and hashtag candidates.
///
/// Searches filter case-insensitively by substring; an empty query returns
/// everything.
#[tower_lsp::async_trait]
pub trait Directory: Send + Sync {
    async fn search_mentions(&self, query: &str) -> Result<Vec<UserCandidate>>;

    async fn search_hashtags(&self, query: &str) -> Result<Vec<TagCandidate>>;

    /// Exact, case-insensitive lookup by username.
    async fn lookup_user(&self, username: &str) -> Result<Option<UserCandidate>>;

    /// Exact, case-insensitive lookup by tag name.
    async fn lookup_tag(&self, name: &str) -> Result<Option<TagCandidate>>;
}

impl From<UserCandidate> for SuggestionItem {
    fn from(user: UserCandidate) -> Self {
        SuggestionItem {
            id: user.id,
            display_label: user.name,
            detail: Some(format!("@{}", user.username)),
            insert_value: user.username,
        }
    }
}

impl From<TagCandidate> for SuggestionItem {
    fn from(tag: TagCandidate) -> Self {
        SuggestionItem {
            id: tag.id,
            display_label: format!("#{}", tag.name),
            detail: Some(format!("{} posts", tag.post_count)),
            insert_value: tag.name,
        }
    }
}

/// Run the search matching `kind` and convert the results to panel items.
///
/// `signed_in` names the session user, who is never offered as a mention.
pub async fn suggestions_for(
    directory: &dyn Directory,
    kind: TriggerKind,
    query: &str,
    signed_in: Option<&str>,
) -> Result<Vec<SuggestionItem>> {
    match kind {
        TriggerKind::Mention => {
            let users = directory.search_mentions(query).await?;
            Ok(users
                .into_iter()
                .filter(|u| signed_in.map_or(true, |me| !u.username.eq_ignore_ascii_case(me)))
                .map(SuggestionItem::from)
                .collect())
        }
        TriggerKind::Hashtag => {
            let tags = directory.search_hashtags(query).await?;
            Ok(tags.into_iter().map(SuggestionItem::from).collect())
        }
    }
}

/// Case-insensitive substring match used by directory implementations.
pub(crate) fn matches_query(field: &str, query_lower: &str) -> bool {
    query_lower.is_empty() || field.to_lowercase().contains(query_lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, name: &str) -> UserCandidate {
        UserCandidate {
            id: format!("u-{username}"),
            name: name.to_string(),
            username: username.to_string(),
            avatar: String::new(),
        }
    }

    fn directory() -> MockDirectory {
        MockDirectory::from_records(
            vec![user("alex", "Alex Kim"), user("alina", "Alina Sorokina"), user("bob", "Bob Stone")],
            vec![TagCandidate {
                id: "t-rust".to_string(),
                name: "rust".to_string(),
                post_count: 12,
            }],
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn mention_suggestions_insert_username() {
        let items = suggestions_for(&directory(), TriggerKind::Mention, "al", None)
            .await
            .unwrap();
        let values: Vec<_> = items.iter().map(|i| i.insert_value.as_str()).collect();
        assert_eq!(values, vec!["alex", "alina"]);
        assert_eq!(items[0].display_label, "Alex Kim");
        assert_eq!(items[0].detail.as_deref(), Some("@alex"));
    }

    #[tokio::test]
    async fn signed_in_user_is_excluded() {
        let items = suggestions_for(&directory(), TriggerKind::Mention, "", Some("ALEX"))
            .await
            .unwrap();
        assert!(items.iter().all(|i| i.insert_value != "alex"));
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn hashtag_suggestions_show_post_count() {
        let items = suggestions_for(&directory(), TriggerKind::Hashtag, "RU", None)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].display_label, "#rust");
        assert_eq!(items[0].detail.as_deref(), Some("12 posts"));
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(matches_query("anything", ""));
        assert!(matches_query("Alex Kim", "kim"));
        assert!(!matches_query("Alex Kim", "bob"));
    }
}
