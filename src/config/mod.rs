//! Configuration management for newsdeck.
//!
//! Configuration is read from `~/.config/newsdeck/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.
//! The `NEWS_API_KEY` environment variable takes precedence over `api.api_key`.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::fetcher::{clamp_page_size, DEFAULT_COUNTRY_CODE, DEFAULT_PAGE_SIZE};

pub const API_BASE_URL: &str = "https://newsapi.org/v2/";
pub const API_KEY_ENV: &str = "NEWS_API_KEY";
pub const SEARCH_TIME_DELAY_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

/// News API connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    /// 2-letter ISO 3166-1 code used for headlines
    pub country: String,
    pub page_size: u32,
    /// Quiet period after the last keystroke before a search is sent
    pub search_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            api_key: String::new(),
            country: DEFAULT_COUNTRY_CODE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            search_delay_ms: SEARCH_TIME_DELAY_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Pull out-of-range values back to something the API accepts.
    pub fn sanitize(&mut self) {
        let page_size = clamp_page_size(self.page_size);
        if page_size != self.page_size {
            tracing::warn!("page_size {} out of range, using {}", self.page_size, page_size);
            self.page_size = page_size;
        }
        if self.timeout_secs == 0 {
            tracing::warn!("timeout_secs must be positive, using {}", DEFAULT_TIMEOUT_SECS);
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
    }
}

impl Config {
    /// Load configuration from the default path, creating it on first run.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    /// Load from an explicit path. Missing files are created with defaults,
    /// missing fields fall back to their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            tracing::info!("Created default config at {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.api.sanitize();
        Ok(config)
    }

    /// Get the default config file path: `~/.config/newsdeck/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("newsdeck").join("config.toml"))
    }

    fn apply_env(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api.api_key = key.trim().to_string();
        }
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, Self::default_config_content()).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn default_config_content() -> &'static str {
        r##"# newsdeck configuration
#
# Colors: named (Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
# DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
# LightCyan, White, Reset) or hex ("#RRGGBB", "#RGB").
#
# Keys: single characters ("a", "/"), special keys (Enter, Tab, BackTab,
# Backspace, Delete, Home, End, PageUp, PageDown, Up, Down, Left, Right,
# Esc, Space, F1-F12), optionally with modifiers ("Ctrl+c", "Alt+Enter").

[api]
base_url = "https://newsapi.org/v2/"
# Get a key at https://newsapi.org/register. NEWS_API_KEY overrides this.
api_key = ""
country = "us"
# Articles per request, 1 to 100
page_size = 20
# Delay after typing before a search is sent
search_delay_ms = 500
timeout_secs = 10

[colors]
active_border = "Cyan"
inactive_border = "DarkGray"
selection_bg = "Cyan"
selection_fg = "Black"
article = "White"
saved_marker = "Yellow"
metadata_source = "Green"
metadata_date = "Yellow"
metadata_link = "Blue"
search_fg = "LightCyan"
status_fg = "White"
status_bg = "DarkGray"
error_fg = "LightRed"

[keybindings]
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
next_page = ["n", "PageDown"]
prev_page = ["p", "PageUp"]
switch_screen = ["Tab", "BackTab"]
select = ["Enter"]
search = ["/"]
save = ["s"]
delete = ["d", "Delete"]
undo = ["u"]
open_in_browser = ["o"]
retry = ["r"]
refresh = ["R"]
"##
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
