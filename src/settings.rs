//! Settings infrastructure for mentionsp.
//!
//! This module provides support for discovering and parsing `settings.toml`
//! files that tune the composer, the mock directory, session storage and
//! logging.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::composer::{AnchorEstimator, AnchorMetrics, MonospaceMirror};
use crate::error::{Error, Result};

/// Root settings structure loaded from settings.toml.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub composer: ComposerSettings,
    pub directory: DirectorySettings,
    pub session: SessionSettings,
    pub log: LogSettings,
}

/// How the panel is sized and anchored.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ComposerSettings {
    /// Character advance as a fraction of the font size.
    pub char_width_ratio: f32,
    pub panel_width: f32,
    pub panel_height: f32,
    pub max_suggestions: usize,
    pub measure: MeasureMode,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        let metrics = AnchorMetrics::default();
        Self {
            char_width_ratio: metrics.char_width_ratio,
            panel_width: metrics.panel_width,
            panel_height: metrics.panel_height,
            max_suggestions: 8,
            measure: MeasureMode::Heuristic,
        }
    }
}

impl ComposerSettings {
    pub fn metrics(&self) -> AnchorMetrics {
        AnchorMetrics {
            char_width_ratio: self.char_width_ratio,
            panel_width: self.panel_width,
            panel_height: self.panel_height,
        }
    }

    /// Build the anchor estimator selected by `measure`.
    pub fn estimator(&self) -> AnchorEstimator {
        match self.measure {
            MeasureMode::Heuristic => AnchorEstimator::heuristic(self.metrics()),
            MeasureMode::Mirror => {
                AnchorEstimator::with_mirror(self.metrics(), Arc::new(MonospaceMirror::new()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureMode {
    #[default]
    Heuristic,
    Mirror,
}

/// Mock directory generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectorySettings {
    /// Fixed seed for reproducible data. Drawn from entropy when absent.
    pub seed: Option<u64>,
    pub users: usize,
    pub tags: usize,
    /// Artificial delay added to every lookup.
    pub latency_ms: u64,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            seed: None,
            users: 40,
            tags: 30,
            latency_ms: 0,
        }
    }
}

impl DirectorySettings {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Session file, relative to the settings directory. In-memory when absent.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive, e.g. `"info"` or `"mentionsp=debug"`.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Parse settings from TOML text.
pub fn parse_settings(content: &str) -> Result<Settings> {
    Ok(toml::from_str(content)?)
}

/// Read and parse a settings file.
pub fn read_settings(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::ReadSettings {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&content)
}

/// Load settings from a settings.toml file.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> Settings {
    if !path.is_file() {
        return Settings::default();
    }
    match read_settings(path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unusable settings file");
            Settings::default()
        }
    }
}

/// Discover settings.toml by searching up the directory tree, then direct children.
///
/// Search order:
/// 1. Walk up from `start_dir` to filesystem root
/// 2. If not found, check immediate child directories of `start_dir`
///
/// Returns `(settings, settings_dir)` where `settings_dir` is the directory
/// containing the found settings.toml (used for resolving relative paths).
/// If not found, returns `(Settings::default(), start_dir)`.
pub fn discover_settings(start_dir: &Path) -> (Settings, PathBuf) {
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        let candidate = dir.join("settings.toml");
        if candidate.is_file() {
            return (load_settings(&candidate), dir.to_path_buf());
        }
        current = dir.parent();
    }

    if let Ok(entries) = std::fs::read_dir(start_dir) {
        for entry in entries.flatten() {
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                let candidate = entry.path().join("settings.toml");
                if candidate.is_file() {
                    return (load_settings(&candidate), entry.path());
                }
            }
        }
    }

    (Settings::default(), start_dir.to_path_buf())
}

/// Resolve the configured session file against the settings directory.
pub fn session_path(settings: &Settings, settings_dir: &Path) -> Option<PathBuf> {
    let path = settings.session.path.as_ref()?;
    Some(if path.is_absolute() {
        path.clone()
    } else {
        settings_dir.join(path)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a unique temp directory for test isolation.
    fn make_test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("mentionsp-test")
            .join(name)
            .join(format!("{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup_test_dir(dir: &Path) {
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings.composer.max_suggestions, 8);
        assert_eq!(settings.composer.measure, MeasureMode::Heuristic);
        assert_eq!(settings.directory.users, 40);
        assert_eq!(settings.directory.seed, None);
        assert_eq!(settings.log.level, "info");
        assert!(settings.session.path.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings = parse_settings(
            r#"
[composer]
panel_width = 320.0
measure = "mirror"

[directory]
seed = 99
latency_ms = 150
"#,
        )
        .unwrap();
        assert_eq!(settings.composer.panel_width, 320.0);
        assert_eq!(settings.composer.panel_height, 200.0);
        assert_eq!(settings.composer.measure, MeasureMode::Mirror);
        assert_eq!(settings.directory.seed, Some(99));
        assert_eq!(settings.directory.latency(), Duration::from_millis(150));
        assert_eq!(settings.directory.tags, 30);
    }

    #[test]
    fn unknown_measure_mode_fails() {
        assert!(parse_settings("[composer]\nmeasure = \"laser\"\n").is_err());
    }

    #[test]
    fn metrics_follow_settings() {
        let settings = parse_settings("[composer]\nchar_width_ratio = 0.5\n").unwrap();
        assert_eq!(settings.composer.metrics().char_width_ratio, 0.5);
    }

    #[test]
    fn load_settings_falls_back_on_bad_file() {
        let dir = make_test_dir("load-bad");
        let path = dir.join("settings.toml");
        std::fs::write(&path, "[composer\n").unwrap();

        let settings = load_settings(&path);
        assert_eq!(settings.composer.max_suggestions, 8);

        cleanup_test_dir(&dir);
    }

    #[test]
    fn read_settings_reports_missing_file() {
        let dir = make_test_dir("read-missing");
        let err = read_settings(&dir.join("settings.toml")).unwrap_err();
        assert!(matches!(err, Error::ReadSettings { .. }));
        cleanup_test_dir(&dir);
    }

    #[test]
    fn session_path_is_relative_to_settings_dir() {
        let settings = parse_settings("[session]\npath = \"state/session.toml\"\n").unwrap();
        let resolved = session_path(&settings, Path::new("/work")).unwrap();
        assert_eq!(resolved, Path::new("/work/state/session.toml"));
        assert!(session_path(&Settings::default(), Path::new("/work")).is_none());
    }

    #[test]
    fn discover_settings_in_current_dir() {
        let dir = make_test_dir("discover-current");
        std::fs::write(dir.join("settings.toml"), "[directory]\nusers = 5\n").unwrap();

        let (settings, settings_dir) = discover_settings(&dir);
        assert_eq!(settings_dir, dir);
        assert_eq!(settings.directory.users, 5);

        cleanup_test_dir(&dir);
    }

    #[test]
    fn discover_settings_in_parent_dir() {
        let parent = make_test_dir("discover-parent");
        let child = parent.join("subdir");
        std::fs::create_dir_all(&child).unwrap();
        std::fs::write(parent.join("settings.toml"), "[directory]\nusers = 6\n").unwrap();

        let (settings, settings_dir) = discover_settings(&child);
        assert_eq!(settings_dir, parent);
        assert_eq!(settings.directory.users, 6);

        cleanup_test_dir(&parent);
    }

    #[test]
    fn discover_settings_in_child_dir() {
        let parent = make_test_dir("discover-child");
        let child = parent.join("config");
        std::fs::create_dir_all(&child).unwrap();
        std::fs::write(child.join("settings.toml"), "[directory]\ntags = 3\n").unwrap();

        let (settings, settings_dir) = discover_settings(&parent);
        assert_eq!(settings_dir, child);
        assert_eq!(settings.directory.tags, 3);

        cleanup_test_dir(&parent);
    }

    #[test]
    fn discover_settings_parent_preferred_over_child() {
        let parent = make_test_dir("discover-priority");
        let child = parent.join("nested");
        std::fs::create_dir_all(&child).unwrap();

        std::fs::write(parent.join("settings.toml"), "[directory]\nusers = 1\n").unwrap();
        std::fs::write(child.join("settings.toml"), "[directory]\nusers = 2\n").unwrap();

        let (settings, settings_dir) = discover_settings(&parent);
        assert_eq!(settings_dir, parent);
        assert_eq!(settings.directory.users, 1);

        cleanup_test_dir(&parent);
    }
}
