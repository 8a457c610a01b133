use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::rules::{Level, LEVEL_COUNT};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

// Anything other than "light" reads as dark
fn lenient_theme<'de, D: Deserializer<'de>>(d: D) -> Result<Theme, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(match raw.as_deref() {
        Some("light") => Theme::Light,
        _ => Theme::Dark,
    })
}

// Stored levels without a built-in rule start on the first level instead
fn lenient_start_level<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let raw = Option::<i64>::deserialize(d)?;
    match raw {
        Some(n) if (1..=i64::from(LEVEL_COUNT)).contains(&n) => Ok(n as u32),
        other => {
            warn!(stored = ?other, "start level out of range, using level 1");
            Ok(Level::FIRST.get())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(deserialize_with = "lenient_theme")]
    pub theme: Theme,
    pub flash_interval_ms: u64,
    pub show_duration_ms: u64,
    pub auto_advance_ms: u64,
    #[serde(deserialize_with = "lenient_start_level")]
    pub start_level: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            flash_interval_ms: 600,
            show_duration_ms: 10_000,
            auto_advance_ms: 1_400,
            start_level: Level::FIRST.get(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config is not valid json: {0}")]
    Parse(#[from] serde_json::Error),
}

pub trait ConfigStore {
    fn try_load(&self) -> Result<Config, ConfigError>;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;

    /// Load the config, falling back to defaults when it is missing or unreadable.
    fn load(&self) -> Config {
        match self.try_load() {
            Ok(cfg) => cfg,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config file, using defaults");
                Config::default()
            }
            Err(e) => {
                warn!(error = %e, "could not read config, using defaults");
                Config::default()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn try_load(&self) -> Result<Config, ConfigError> {
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice::<Config>(&bytes)?)
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

/// Write only the theme entry back, leaving the rest of the stored file as it was.
/// A failed write is logged and otherwise ignored.
pub fn persist_theme<C: ConfigStore + ?Sized>(store: &C, theme: Theme) {
    let mut stored = store.load();
    stored.theme = theme;
    if let Err(e) = store.save(&stored) {
        warn!(error = %e, %theme, "could not save theme preference");
    }
}

pub fn toggle_theme<C: ConfigStore + ?Sized>(store: &C, cfg: &mut Config) -> Theme {
    cfg.theme = cfg.theme.toggled();
    persist_theme(store, cfg.theme);
    cfg.theme
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            theme: Theme::Light,
            flash_interval_ms: 300,
            show_duration_ms: 4_000,
            auto_advance_ms: 800,
            start_level: 3,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_matches!(store.try_load(), Err(ConfigError::Io(_)));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn garbage_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{not json").unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_matches!(store.try_load(), Err(ConfigError::Parse(_)));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"theme":"light"}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.theme, Theme::Light);
        assert_eq!(cfg.show_duration_ms, 10_000);
    }

    #[test]
    fn unknown_theme_reads_as_dark() {
        let cfg: Config = serde_json::from_str(r#"{"theme":"purple"}"#).unwrap();
        assert_eq!(cfg.theme, Theme::Dark);
        let cfg: Config = serde_json::from_str(r#"{"theme":null}"#).unwrap();
        assert_eq!(cfg.theme, Theme::Dark);
    }

    #[test]
    fn start_level_without_rule_reads_as_first() {
        for raw in ["0", "7", "-3", "null"] {
            let json = format!(r#"{{"start_level":{raw},"show_duration_ms":4000}}"#);
            let cfg: Config = serde_json::from_str(&json).unwrap();
            assert_eq!(cfg.start_level, 1, "stored {raw}");
            assert_eq!(cfg.show_duration_ms, 4_000);
        }
        let cfg: Config = serde_json::from_str(r#"{"start_level":5}"#).unwrap();
        assert_eq!(cfg.start_level, 5);
    }

    #[test]
    fn theme_is_stored_as_plain_word() {
        let json = serde_json::to_string(&Config {
            theme: Theme::Light,
            ..Config::default()
        })
        .unwrap();
        assert!(json.contains(r#""theme":"light""#));
    }

    #[test]
    fn toggle_theme_persists_each_flip() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let mut cfg = Config::default();

        assert_eq!(toggle_theme(&store, &mut cfg), Theme::Light);
        assert_eq!(store.load().theme, Theme::Light);
        assert_eq!(toggle_theme(&store, &mut cfg), Theme::Dark);
        assert_eq!(store.load().theme, Theme::Dark);
    }

    #[test]
    fn persisting_theme_keeps_other_stored_values() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let stored = Config {
            show_duration_ms: 3_000,
            ..Config::default()
        };
        store.save(&stored).unwrap();

        // a run-only override must not leak into the file
        let mut run = Config {
            show_duration_ms: 500,
            ..stored.clone()
        };
        toggle_theme(&store, &mut run);

        let loaded = store.load();
        assert_eq!(loaded.theme, Theme::Light);
        assert_eq!(loaded.show_duration_ms, 3_000);
    }

    #[test]
    fn toggle_theme_survives_unwritable_store() {
        let dir = tempdir().unwrap();
        // parent "directory" is a regular file, so the write fails
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let store = FileConfigStore::with_path(blocker.join("config.json"));
        let mut cfg = Config::default();
        assert_eq!(toggle_theme(&store, &mut cfg), Theme::Light);
        assert_eq!(cfg.theme, Theme::Light);
    }
}
