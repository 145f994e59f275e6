//! In-process directory backed by generated demo data.
//!
//! Data is generated once from a seed, so every lookup in a session sees the
//! same users and tags and tests can pin the seed for reproducible output.

use std::collections::HashSet;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{matches_query, Directory, Result, TagCandidate, UserCandidate};

const FIRST_NAMES: &[&str] = &[
    "Alex", "Alina", "Amara", "Ben", "Carmen", "Chen", "Dana", "Diego", "Elif", "Farah", "Gabe",
    "Hana", "Ivan", "Jonas", "Kai", "Lena", "Marco", "Nadia", "Omar", "Priya", "Quinn", "Rosa",
    "Sam", "Tariq", "Uma", "Viktor", "Wen", "Yara", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Baker", "Castillo", "Dubois", "Eriksen", "Fischer", "Garcia", "Haddad", "Ito",
    "Jensen", "Kowalski", "Lindqvist", "Moreau", "Nakamura", "Okafor", "Petrov", "Quist", "Rossi",
    "Silva", "Tanaka", "Usman", "Varga", "Weber", "Yilmaz", "Zhang",
];

const TAG_WORDS: &[&str] = &[
    "art", "books", "coffee", "cooking", "design", "fitness", "food", "gaming", "garden",
    "hiking", "indie", "jazz", "music", "nature", "photography", "pets", "reels", "running",
    "rust", "science", "skate", "sunset", "tech", "throwback", "travel", "vegan", "vinyl",
    "weekend", "wellness", "yoga",
];

const MESSAGES: &[&str] = &[
    "see you tomorrow!",
    "did you watch the reel I sent?",
    "haha that's great",
    "can you share the photo?",
    "on my way",
    "thanks for the tag",
];

/// A conversation with someone the user has already messaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: String,
    pub participant: UserCandidate,
    pub last_message: String,
    pub unread: u32,
}

/// A suggested contact with no conversation yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyUser {
    pub id: String,
    pub name: String,
    pub username: String,
}

/// One row of the chat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEntry {
    Real(Chat),
    Placeholder(DummyUser),
}

impl ChatEntry {
    /// The person behind this row, as a mention candidate.
    pub fn contact(&self) -> UserCandidate {
        match self {
            ChatEntry::Real(chat) => chat.participant.clone(),
            ChatEntry::Placeholder(dummy) => UserCandidate {
                id: dummy.id.clone(),
                name: dummy.name.clone(),
                username: dummy.username.clone(),
                avatar: avatar_url(&dummy.username),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockDirectory {
    users: Vec<UserCandidate>,
    tags: Vec<TagCandidate>,
    chats: Vec<ChatEntry>,
    latency: Duration,
}

impl MockDirectory {
    /// Generate `user_count` users, up to `tag_count` tags and a chat list.
    pub fn generate(seed: u64, user_count: usize, tag_count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut taken = HashSet::new();
        let users: Vec<UserCandidate> = (0..user_count)
            .map(|i| {
                let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("User");
                let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Person");
                let mut username = match rng.gen_range(0..3) {
                    0 => format!("{}{}", first, last),
                    1 => format!("{}_{}", first, last),
                    _ => format!("{}{}", first, rng.gen_range(1..100)),
                }
                .to_lowercase();
                if !taken.insert(username.clone()) {
                    username = format!("{username}_{i}");
                    taken.insert(username.clone());
                }
                UserCandidate {
                    id: format!("user-{i}"),
                    name: format!("{first} {last}"),
                    avatar: avatar_url(&username),
                    username,
                }
            })
            .collect();

        let mut words: Vec<&str> = TAG_WORDS.to_vec();
        words.shuffle(&mut rng);
        let mut tags: Vec<TagCandidate> = words
            .into_iter()
            .take(tag_count)
            .enumerate()
            .map(|(i, word)| TagCandidate {
                id: format!("tag-{i}"),
                name: word.to_string(),
                post_count: rng.gen_range(1..50_000),
            })
            .collect();
        tags.sort_by(|a, b| b.post_count.cmp(&a.post_count));

        let chats = users
            .iter()
            .take(8)
            .enumerate()
            .map(|(i, user)| {
                if rng.gen_bool(0.75) {
                    ChatEntry::Real(Chat {
                        id: format!("chat-{i}"),
                        participant: user.clone(),
                        last_message: MESSAGES.choose(&mut rng).copied().unwrap_or("hi").to_string(),
                        unread: rng.gen_range(0..5),
                    })
                } else {
                    ChatEntry::Placeholder(DummyUser {
                        id: user.id.clone(),
                        name: user.name.clone(),
                        username: user.username.clone(),
                    })
                }
            })
            .collect();

        Self {
            users,
            tags,
            chats,
            latency: Duration::ZERO,
        }
    }

    /// Build a directory from fixed records.
    pub fn from_records(users: Vec<UserCandidate>, tags: Vec<TagCandidate>, chats: Vec<ChatEntry>) -> Self {
        Self {
            users,
            tags,
            chats,
            latency: Duration::ZERO,
        }
    }

    /// Delay every lookup, to mimic a remote service.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn users(&self) -> &[UserCandidate] {
        &self.users
    }

    pub fn tags(&self) -> &[TagCandidate] {
        &self.tags
    }

    pub fn chats(&self) -> &[ChatEntry] {
        &self.chats
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[tower_lsp::async_trait]
impl Directory for MockDirectory {
    /// Chat contacts come first, then the rest of the directory.
    async fn search_mentions(&self, query: &str) -> Result<Vec<UserCandidate>> {
        self.simulate_latency().await;
        let query = query.to_lowercase();

        let mut seen = HashSet::new();
        let candidates = self
            .chats
            .iter()
            .map(ChatEntry::contact)
            .chain(self.users.iter().cloned())
            .filter(|u| matches_query(&u.name, &query) || matches_query(&u.username, &query))
            .filter(|u| seen.insert(u.username.clone()))
            .collect();
        Ok(candidates)
    }

    async fn search_hashtags(&self, query: &str) -> Result<Vec<TagCandidate>> {
        self.simulate_latency().await;
        let query = query.to_lowercase();
        Ok(self
            .tags
            .iter()
            .filter(|t| matches_query(&t.name, &query))
            .cloned()
            .collect())
    }

    async fn lookup_user(&self, username: &str) -> Result<Option<UserCandidate>> {
        Ok(self
            .users
            .iter()
            .chain(self.chats.iter().filter_map(|c| match c {
                ChatEntry::Real(chat) => Some(&chat.participant),
                ChatEntry::Placeholder(_) => None,
            }))
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn lookup_tag(&self, name: &str) -> Result<Option<TagCandidate>> {
        Ok(self
            .tags
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .cloned())
    }
}

fn avatar_url(username: &str) -> String {
    format!("https://avatars.example.invalid/{username}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str) -> UserCandidate {
        UserCandidate {
            id: format!("u-{username}"),
            name: username.to_uppercase(),
            username: username.to_string(),
            avatar: avatar_url(username),
        }
    }

    #[test]
    fn same_seed_same_data() {
        let a = MockDirectory::generate(7, 20, 10);
        let b = MockDirectory::generate(7, 20, 10);
        assert_eq!(a.users(), b.users());
        assert_eq!(a.tags(), b.tags());
        assert_eq!(a.chats(), b.chats());
    }

    #[test]
    fn generated_usernames_are_unique() {
        let dir = MockDirectory::generate(42, 200, 5);
        let names: HashSet<_> = dir.users().iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names.len(), 200);
    }

    #[test]
    fn tag_count_is_capped_by_word_pool() {
        let dir = MockDirectory::generate(1, 0, 1_000);
        assert_eq!(dir.tags().len(), TAG_WORDS.len());
        assert!(dir.chats().is_empty());
    }

    #[test]
    fn chat_entries_expose_contacts() {
        let real = ChatEntry::Real(Chat {
            id: "c1".to_string(),
            participant: user("ana"),
            last_message: "hey".to_string(),
            unread: 1,
        });
        let placeholder = ChatEntry::Placeholder(DummyUser {
            id: "d1".to_string(),
            name: "Bo".to_string(),
            username: "bo".to_string(),
        });
        assert_eq!(real.contact().username, "ana");
        assert_eq!(placeholder.contact().avatar, avatar_url("bo"));
    }

    #[tokio::test]
    async fn chat_contacts_rank_first_without_duplicates() {
        let dir = MockDirectory::from_records(
            vec![user("alex"), user("alma")],
            Vec::new(),
            vec![ChatEntry::Placeholder(DummyUser {
                id: "u-alma".to_string(),
                name: "ALMA".to_string(),
                username: "alma".to_string(),
            })],
        );
        let found = dir.search_mentions("al").await.unwrap();
        let names: Vec<_> = found.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alma", "alex"]);
    }

    #[tokio::test]
    async fn hashtag_search_is_case_insensitive() {
        let dir = MockDirectory::from_records(
            Vec::new(),
            vec![TagCandidate {
                id: "t1".to_string(),
                name: "Photography".to_string(),
                post_count: 3,
            }],
            Vec::new(),
        );
        assert_eq!(dir.search_hashtags("PHOTO").await.unwrap().len(), 1);
        assert!(dir.search_hashtags("music").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn exact_lookups() {
        let dir = MockDirectory::from_records(vec![user("alex")], Vec::new(), Vec::new());
        assert!(dir.lookup_user("ALEX").await.unwrap().is_some());
        assert!(dir.lookup_user("ale").await.unwrap().is_none());
        assert!(dir.lookup_tag("rust").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn latency_delays_lookup() {
        let dir = MockDirectory::from_records(vec![user("alex")], Vec::new(), Vec::new())
            .with_latency(Duration::from_millis(20));
        let start = tokio::time::Instant::now();
        dir.search_mentions("").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
