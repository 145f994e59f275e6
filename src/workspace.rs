//! Shared collaborators configured once per server.

use std::path::Path;
use std::sync::Arc;

use crate::composer::{AnchorEstimator, Composer};
use crate::directory::{Directory, MockDirectory};
use crate::session::{FileSessionStore, MemorySessionStore, SessionStore};
use crate::settings::{session_path, Settings};

/// Everything a document needs that outlives the document.
#[derive(Clone)]
pub struct Workspace {
    pub directory: Arc<dyn Directory>,
    pub estimator: AnchorEstimator,
    pub max_suggestions: usize,
    pub session_store: Arc<dyn SessionStore>,
}

impl Workspace {
    /// Build the mock directory, estimator and session store from settings.
    ///
    /// Without a configured seed the directory is seeded from OS entropy.
    pub fn from_settings(settings: &Settings, settings_dir: &Path) -> Self {
        let seed = settings.directory.seed.unwrap_or_else(rand::random);
        tracing::info!(
            seed,
            users = settings.directory.users,
            tags = settings.directory.tags,
            "generating mock directory"
        );
        let directory = MockDirectory::generate(seed, settings.directory.users, settings.directory.tags)
            .with_latency(settings.directory.latency());

        let session_store: Arc<dyn SessionStore> = match session_path(settings, settings_dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using file session store");
                Arc::new(FileSessionStore::new(path))
            }
            None => Arc::new(MemorySessionStore::new()),
        };

        Self {
            directory: Arc::new(directory),
            estimator: settings.composer.estimator(),
            max_suggestions: settings.composer.max_suggestions,
            session_store,
        }
    }

    /// Workspace around a caller-supplied directory, with in-memory session.
    pub fn with_directory(directory: Arc<dyn Directory>) -> Self {
        let settings = Settings::default();
        Self {
            directory,
            estimator: settings.composer.estimator(),
            max_suggestions: settings.composer.max_suggestions,
            session_store: Arc::new(MemorySessionStore::new()),
        }
    }

    pub fn composer(&self) -> Composer {
        Composer::new(self.estimator.clone(), self.max_suggestions)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::from_settings(&Settings::default(), Path::new("."))
    }
}
