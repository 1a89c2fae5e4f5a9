//! Content script configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use detour_embeds::PlaceholderResource;
use detour_storage::Database;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the preferences database
    pub database_path: PathBuf,
    /// Absolute URL of the placeholder page shown in place of embeds
    pub placeholder_url: String,
    /// URI prefix of the alternate player
    pub player_scheme: String,
    /// Where the current tab goes after handing a video to the alternate player
    pub fallback_homepage: String,
    /// Button label used until the settings peer supplies one
    pub default_button_label: String,
    /// Debounce window for embed scans, in milliseconds
    pub scan_debounce_ms: u64,
    /// Whether the script runs in the top-level document
    pub is_top_level: bool,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("detour.db"),
            placeholder_url: "chrome-extension://detour/iframe-placeholder.html".to_string(),
            player_scheme: "freetube://".to_string(),
            fallback_homepage: "https://www.youtube.com".to_string(),
            default_button_label: "Watch on".to_string(),
            scan_debounce_ms: 50,
            is_top_level: true,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Detour"))
            .unwrap_or_else(|| PathBuf::from(".detour"))
    }

    pub fn scan_debounce(&self) -> Duration {
        Duration::from_millis(self.scan_debounce_ms)
    }

    pub fn placeholder(&self) -> Result<PlaceholderResource> {
        Ok(PlaceholderResource::parse(&self.placeholder_url)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.placeholder()?;

        if !self.player_scheme.ends_with("://") {
            return Err(CoreError::Config(format!(
                "player scheme must end with \"://\": {}",
                self.player_scheme
            )));
        }

        if self.default_button_label.trim().is_empty() {
            return Err(CoreError::Config(
                "default button label cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Open the preferences database, creating its directory if needed.
    pub fn open_database(&self) -> Result<Database> {
        if let Some(parent) = self.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Ok(Database::open(&self.database_path)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

/// Per-user local data directory, resolved from the environment.
mod dirs {
    use std::env;
    use std::path::PathBuf;

    fn home_join(relative: &str) -> Option<PathBuf> {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(relative))
    }

    pub fn data_local_dir() -> Option<PathBuf> {
        if cfg!(target_os = "windows") {
            env::var_os("LOCALAPPDATA").map(PathBuf::from)
        } else if cfg!(target_os = "macos") {
            home_join("Library/Application Support")
        } else if cfg!(unix) {
            env::var_os("XDG_DATA_HOME")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from)
                .or_else(|| home_join(".local/share"))
        } else {
            None
        }
    }
}
