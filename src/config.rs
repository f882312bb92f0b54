//! Bot configuration loaded from the environment

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::store::{StoreConfig, DEFAULT_DATA_DIR};

/// Errors raised while reading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
}

/// Runtime configuration for the bot process
#[derive(Clone)]
pub struct BotConfig {
    /// Installation root; documents live under `<root>/<data_dir_name>`
    pub root_dir: PathBuf,
    pub data_dir_name: String,
    /// Platform token, never logged
    pub bot_token: Option<String>,
    /// Channel watched by the message cache and random messages
    pub random_channel: Option<String>,
    /// Messages between two random posts
    pub msg_cap: usize,
    /// Cached messages needed before sampling without a mention
    pub min_cached: usize,
    /// Max cached messages kept per channel
    pub cache_limit: usize,
    pub presence: String,
    pub status: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            data_dir_name: DEFAULT_DATA_DIR.to_string(),
            bot_token: None,
            random_channel: None,
            msg_cap: 20,
            min_cached: 50,
            cache_limit: 500,
            presence: "Watching over Tsukiyo".to_string(),
            status: "dnd".to_string(),
        }
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("root_dir", &self.root_dir)
            .field("data_dir_name", &self.data_dir_name)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("random_channel", &self.random_channel)
            .field("msg_cap", &self.msg_cap)
            .field("min_cached", &self.min_cached)
            .field("cache_limit", &self.cache_limit)
            .field("presence", &self.presence)
            .field("status", &self.status)
            .finish()
    }
}

impl BotConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_lookup(&current_dir, |key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Relative `TSUKIYO_ROOT` values are joined onto `current_dir`.
    pub fn from_lookup<F>(current_dir: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            root_dir: current_dir.to_path_buf(),
            ..Self::default()
        };

        if let Some(root) = lookup("TSUKIYO_ROOT") {
            let root = PathBuf::from(root);
            config.root_dir = if root.is_absolute() {
                root
            } else {
                current_dir.join(root)
            };
        }

        if let Some(name) = lookup("TSUKIYO_DATA_DIR") {
            config.data_dir_name = name;
        }

        config.bot_token = lookup("BOT_TOKEN").filter(|t| !t.is_empty());
        config.random_channel = lookup("TSUKIYO_RANDOM_CHANNEL").filter(|c| !c.is_empty());

        if let Some(value) = lookup("TSUKIYO_MSG_CAP") {
            config.msg_cap = parse_positive("TSUKIYO_MSG_CAP", value)?;
        }
        if let Some(value) = lookup("TSUKIYO_MIN_CACHED") {
            config.min_cached = parse_positive("TSUKIYO_MIN_CACHED", value)?;
        }
        if let Some(value) = lookup("TSUKIYO_CACHE_LIMIT") {
            config.cache_limit = parse_positive("TSUKIYO_CACHE_LIMIT", value)?;
        }

        if let Some(presence) = lookup("TSUKIYO_PRESENCE") {
            config.presence = presence;
        }
        if let Some(status) = lookup("TSUKIYO_STATUS") {
            config.status = status;
        }

        Ok(config)
    }

    /// Store configuration derived from this config
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.root_dir).with_data_dir_name(self.data_dir_name.clone())
    }
}

fn parse_positive(key: &'static str, value: String) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { key, value }),
    }
}
