use crate::corpus::Difficulty;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Completion policy selector for a test.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Stop at a wall-clock limit.
    Time,
    /// Stop at a token-count limit.
    Words,
    /// Stop only at full-text reproduction.
    Custom,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Neon,
    Retro,
}

/// User-facing configuration. Owned and mutated by the shell; the session
/// controller only ever reads a snapshot of it at session start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub mode: Mode,
    /// Seconds; consulted only when `mode == Time`.
    pub time_limit: u64,
    /// Whitespace-delimited tokens; consulted only when `mode == Words`.
    pub word_limit: usize,
    pub font_size: u16,
    pub sound_enabled: bool,
    pub theme: Theme,
    pub show_keyboard: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Intermediate,
            mode: Mode::Time,
            time_limit: 60,
            word_limit: 50,
            font_size: 18,
            sound_enabled: true,
            theme: Theme::Dark,
            show_keyboard: true,
        }
    }
}

impl GameSettings {
    /// The limit relevant to the active mode must be positive.
    pub fn is_valid(&self) -> bool {
        match self.mode {
            Mode::Time => self.time_limit > 0,
            Mode::Words => self.word_limit > 0,
            Mode::Custom => true,
        }
    }

    /// Replace a zero limit with the default so a hand-edited settings file
    /// cannot produce a test that ends before it starts.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.time_limit == 0 {
            self.time_limit = defaults.time_limit;
        }
        if self.word_limit == 0 {
            self.word_limit = defaults.word_limit;
        }
        self
    }
}

pub trait SettingsStore {
    fn load(&self) -> GameSettings;
    fn save(&self, settings: &GameSettings) -> std::io::Result<()>;
}

/// JSON-backed settings persistence under the platform config directory.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "swifttype") {
            pd.config_dir().join("settings.json")
        } else {
            PathBuf::from("swifttype_settings.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> GameSettings {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(settings) = serde_json::from_slice::<GameSettings>(&bytes) {
                return settings.sanitized();
            }
        }
        GameSettings::default()
    }

    fn save(&self, settings: &GameSettings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
