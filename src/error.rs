//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::directory::DirectoryError;
use crate::session::SessionError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read settings file '{}': {source}", path.display())]
    ReadSettings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("invalid command arguments: {0}")]
    CommandArguments(#[from] serde_json::Error),
}
