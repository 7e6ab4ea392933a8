//! GUI session state carried between launches.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub rows: usize,
    pub cols: usize,
    pub last_directory: Option<PathBuf>,
    pub editor_cmd: String,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 1,
            last_directory: None,
            editor_cmd: std::env::var("EDITOR").unwrap_or_else(|_| "gedit".to_string()),
        }
    }
}

impl Session {
    pub fn default_path() -> PathBuf {
        std::env::temp_dir().join("tiltring-session.json")
    }

    /// A missing or unreadable session file falls back to the defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(text) => {
                if let Err(e) = std::fs::write(path, text) {
                    tracing::warn!(error = %e, "could not write session file");
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not serialize session"),
        }
    }
}
