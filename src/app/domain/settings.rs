use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::infrastructure::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_window_width")]
    pub window_width: i32,

    #[serde(default = "default_window_height")]
    pub window_height: i32,

    #[serde(default = "default_min_width")]
    pub min_width: i32,

    #[serde(default = "default_min_height")]
    pub min_height: i32,

    /// Start open/save dialogs in the directory used last time
    #[serde(default = "default_remember_last_directory")]
    pub remember_last_directory: bool,

    #[serde(default)]
    pub last_open_directory: Option<String>,

    /// `tracing` filter used when `CHERRY_MUSE_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_window_width() -> i32 {
    1400
}

fn default_window_height() -> i32 {
    900
}

fn default_min_width() -> i32 {
    800
}

fn default_min_height() -> i32 {
    600
}

fn default_remember_last_directory() -> bool {
    true
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            min_width: default_min_width(),
            min_height: default_min_height(),
            remember_last_directory: default_remember_last_directory(),
            last_open_directory: None,
            log_filter: default_log_filter(),
        }
    }
}

impl AppSettings {
    /// Load settings from disk, or create default if not exists
    pub fn load() -> Self {
        Self::load_from(&Self::get_config_path())
    }

    pub fn load_from(config_path: &Path) -> Self {
        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_json::from_str::<AppSettings>(&contents) {
                Ok(settings) => settings.sanitized(),
                Err(e) => {
                    tracing::warn!("Failed to parse settings: {}. Using defaults.", e);
                    Self::default()
                }
            },
            Err(_) => {
                // File doesn't exist, use defaults
                let default = Self::default();
                // Try to save defaults for next time
                let _ = default.save_to(config_path);
                default
            }
        }
    }

    /// Save settings to disk
    pub fn save_to(&self, config_path: &Path) -> Result<(), AppError> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(config_path, json)?;

        Ok(())
    }

    /// Get config file path (cross-platform)
    pub fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("cherry-muse");
        path.push("settings.json");
        path
    }

    /// Directory to start file dialogs in, if remembering is enabled.
    pub fn start_directory(&self) -> Option<PathBuf> {
        if !self.remember_last_directory {
            return None;
        }
        self.last_open_directory.as_ref().map(PathBuf::from)
    }

    /// Clamp window geometry so a hand-edited file can't produce an
    /// unusable window.
    fn sanitized(mut self) -> Self {
        self.min_width = self.min_width.max(200);
        self.min_height = self.min_height.max(150);
        self.window_width = self.window_width.max(self.min_width);
        self.window_height = self.window_height.max(self.min_height);
        self
    }
}
