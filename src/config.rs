// Configuration for the Last.fm bot
//
// Service settings live in the "services" subtree; a service block at the top
// level of the file is still accepted.

use crate::helpers::lastfm::{LASTFM_API_1_0, LASTFM_API_2_0, LASTFM_USER_PAGE};
use crate::helpers::youtube::YOUTUBE_SEARCH_URL;
use crate::parsers::TrackSource;
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that supplies the Last.fm API key when the file has none
pub const LASTFM_API_KEY_ENV: &str = "LASTFM_API_KEY";
/// Environment variable that supplies the YouTube API key when the file has none
pub const YOUTUBE_API_KEY_ENV: &str = "YOUTUBE_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0:?}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Helper function to get service configuration with backward compatibility
///
/// Looks in the "services" subtree first, then at the top level.
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use lastfmbot::config::get_service_config;
///
/// let config = json!({ "services": { "lastfm": { "api_key": "abc" } } });
/// assert_eq!(get_service_config(&config, "lastfm").unwrap()["api_key"], "abc");
///
/// let old_config = json!({ "youtube": { "enabled": false } });
/// assert_eq!(get_service_config(&old_config, "youtube").unwrap()["enabled"], false);
/// ```
pub fn get_service_config<'a>(config: &'a Value, service_name: &str) -> Option<&'a Value> {
    if let Some(service_config) = config.get("services").and_then(|s| s.get(service_name)) {
        debug!("Found {} configuration in services section", service_name);
        return Some(service_config);
    }

    if let Some(service_config) = config.get(service_name) {
        debug!("Found {} configuration at top level (legacy structure)", service_name);
        return Some(service_config);
    }

    debug!("No {} configuration found in either services section or top level", service_name);
    None
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastfmServiceConfig {
    /// Key for the 2.0 web service
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub recent_tracks_source: TrackSource,

    #[serde(default = "default_api_1_0")]
    pub api_1_0_url: String,

    #[serde(default = "default_api_2_0")]
    pub api_2_0_url: String,

    #[serde(default = "default_user_page")]
    pub user_page_url: String,
}

fn default_api_1_0() -> String {
    LASTFM_API_1_0.to_string()
}

fn default_api_2_0() -> String {
    LASTFM_API_2_0.to_string()
}

fn default_user_page() -> String {
    LASTFM_USER_PAGE.to_string()
}

impl Default for LastfmServiceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            recent_tracks_source: TrackSource::default(),
            api_1_0_url: default_api_1_0(),
            api_2_0_url: default_api_2_0(),
            user_page_url: default_user_page(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct YoutubeServiceConfig {
    #[serde(default)]
    pub api_key: String,

    /// Without it, now-playing replies carry no video link
    #[serde(default = "default_true", alias = "enable")]
    pub enabled: bool,

    #[serde(default = "default_search_url")]
    pub search_url: String,
}

fn default_true() -> bool {
    true
}

fn default_search_url() -> String {
    YOUTUBE_SEARCH_URL.to_string()
}

impl Default for YoutubeServiceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            enabled: true,
            search_url: default_search_url(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelConfig {
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_directory")]
    pub directory: PathBuf,
}

fn default_db_directory() -> PathBuf {
    PathBuf::from("/var/lib/lastfmbot")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { directory: default_db_directory() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: default_timeout_secs() }
    }
}

/// Complete bot configuration, every field optional in the file
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(skip)]
    pub lastfm: LastfmServiceConfig,

    #[serde(skip)]
    pub youtube: YoutubeServiceConfig,

    /// Entries listed by `lastfm` and artists requested by `compare`
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Per-channel overrides, keyed by channel name
    #[serde(default)]
    pub channels: HashMap<String, ChannelConfig>,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub http: HttpConfig,

    /// Seconds between identity store flushes in the interactive host
    #[serde(default = "default_flush_interval")]
    pub flush_interval_secs: u64,

    /// Replies longer than this many characters are cut
    #[serde(default)]
    pub reply_max_chars: Option<usize>,
}

fn default_max_results() -> usize {
    10
}

fn default_flush_interval() -> u64 {
    300
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            lastfm: LastfmServiceConfig::default(),
            youtube: YoutubeServiceConfig::default(),
            max_results: default_max_results(),
            channels: HashMap::new(),
            database: DatabaseConfig::default(),
            http: HttpConfig::default(),
            flush_interval_secs: default_flush_interval(),
            reply_max_chars: None,
        }
    }
}

impl BotConfig {
    /// Build the configuration from parsed JSON
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let mut config: BotConfig = serde_json::from_value(value.clone())?;
        if let Some(lastfm) = get_service_config(value, "lastfm") {
            config.lastfm = serde_json::from_value(lastfm.clone())?;
        }
        if let Some(youtube) = get_service_config(value, "youtube") {
            config.youtube = serde_json::from_value(youtube.clone())?;
        }
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Load the configuration file and apply environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let mut config = Self::from_json(&content)?;
        config.apply_env_overrides();
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Fill empty API keys from the environment
    pub fn apply_env_overrides(&mut self) {
        if self.lastfm.api_key.is_empty() {
            if let Ok(key) = std::env::var(LASTFM_API_KEY_ENV) {
                debug!("Using Last.fm API key from {}", LASTFM_API_KEY_ENV);
                self.lastfm.api_key = key;
            }
        }
        if self.youtube.api_key.is_empty() {
            if let Ok(key) = std::env::var(YOUTUBE_API_KEY_ENV) {
                debug!("Using YouTube API key from {}", YOUTUBE_API_KEY_ENV);
                self.youtube.api_key = key;
            }
        }
    }

    /// Result limit for a channel, falling back to the global one
    pub fn max_results_for(&self, channel: Option<&str>) -> usize {
        channel
            .and_then(|name| self.channels.get(name))
            .and_then(|c| c.max_results)
            .unwrap_or(self.max_results)
    }
}
