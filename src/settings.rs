use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const WPM_MIN: u32 = 50;
pub const WPM_MAX: u32 = 1000;
pub const FONT_SIZE_MIN: u32 = 16;
pub const FONT_SIZE_MAX: u32 = 72;

/// Reader preferences, owned by the shell and passed by value into the
/// pacer. Mid-session changes are delivered with `Pacer::update_settings`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReaderSettings {
    pub wpm: u32,
    pub font_size: u32,
    pub highlight_mode: bool,
    pub pause_at_punctuation: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            wpm: 250,
            font_size: 24,
            highlight_mode: true,
            pause_at_punctuation: true,
        }
    }
}

impl ReaderSettings {
    /// Clamp both numeric fields into their supported ranges.
    pub fn clamped(self) -> Self {
        Self {
            wpm: self.wpm.clamp(WPM_MIN, WPM_MAX),
            font_size: self.font_size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX),
            ..self
        }
    }
}

pub trait SettingsStore {
    fn load(&self) -> ReaderSettings;
    fn save(&self, settings: &ReaderSettings) -> std::io::Result<()>;
}

/// JSON-file backed settings store. The engines never touch this; it
/// exists so the shell can keep preferences between runs.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "reable") {
            pd.config_dir().join("settings.json")
        } else {
            PathBuf::from("reable_settings.json")
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
    fn load(&self) -> ReaderSettings {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(settings) = serde_json::from_slice::<ReaderSettings>(&bytes) {
                return settings.clamped();
            }
        }
        ReaderSettings::default()
    }

    fn save(&self, settings: &ReaderSettings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
