//! User settings persisted in the OS config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::schedule::ReleasePolicy;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Timeline zoom used to convert pointer deltas into days.
    pub pixels_per_day: f32,
    /// Whether a drag released off the timeline still commits.
    pub release_policy: ReleasePolicy,
    /// Default `tracing` filter; `RUST_LOG` overrides it.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pixels_per_day: 18.0,
            release_policy: ReleasePolicy::CommitAnywhere,
            log_filter: "wbs_tracker=info".into(),
        }
    }
}

impl Settings {
    /// Location of the settings file, falling back to the working directory.
    pub fn config_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "WbsTracker") {
            proj_dirs.config_dir().join(SETTINGS_FILE)
        } else {
            PathBuf::from(".").join(SETTINGS_FILE)
        }
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Read settings from `path`. Missing or unreadable files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    "Failed to parse settings {}: {}, using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}
