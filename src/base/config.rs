//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::base::phrases;

use super::types::{BotError, Res};

/// Keys that accept comma-separated lists when supplied through the environment.
const LIST_KEYS: &[&str] = &["monitored_chat_ids", "dispute_phrases", "keywords", "sticker_assets", "card_assets"];

/// Default Telegram Bot API base URL.
fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

/// Default long-poll timeout for `getUpdates`.
fn default_telegram_poll_timeout_secs() -> u64 {
    30
}

fn default_db_namespace() -> String {
    "zeldos".to_string()
}

fn default_db_database() -> String {
    "bot".to_string()
}

/// Default cooldown after a dispute alert (one hour).
fn default_dispute_timeout_secs() -> u64 {
    3600
}

/// Default burst-detection horizon (five minutes).
fn default_message_window_secs() -> u64 {
    300
}

/// Default burst threshold.
fn default_min_messages() -> usize {
    20
}

fn default_dispute_phrases() -> Vec<String> {
    phrases::DISPUTE_PHRASES.iter().map(|p| p.to_string()).collect()
}

fn default_dispute_reset_marker() -> String {
    phrases::DISPUTE_RESET_MARKER.to_string()
}

fn default_dispute_alert_text() -> String {
    phrases::DISPUTE_ALERT_TEXT.to_string()
}

fn default_keywords() -> Vec<String> {
    phrases::KEYWORDS.iter().map(|k| k.to_string()).collect()
}

/// Default chance (in percent) that a keyword without a question mark gets a reaction.
fn default_response_chance_percent() -> u8 {
    50
}

fn default_true() -> bool {
    true
}

/// Configuration for the zeldos-bot application.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Telegram bot token (`TELEGRAM_BOT_TOKEN`).
    pub telegram_bot_token: String,
    /// Telegram Bot API base URL (`TELEGRAM_API_BASE`).
    #[serde(default = "default_telegram_api_base")]
    pub telegram_api_base: String,
    /// Long-poll timeout in seconds for `getUpdates` (`TELEGRAM_POLL_TIMEOUT_SECS`).
    #[serde(default = "default_telegram_poll_timeout_secs")]
    pub telegram_poll_timeout_secs: u64,
    /// Database endpoint URL, e.g. `mem://` or `ws://localhost:8000` (`DB_ENDPOINT`).
    pub db_endpoint: String,
    /// Database username (`DB_USERNAME`).
    #[serde(default)]
    pub db_username: Option<String>,
    /// Database password (`DB_PASSWORD`).
    #[serde(default)]
    pub db_password: Option<String>,
    /// Database namespace (`DB_NAMESPACE`).
    #[serde(default = "default_db_namespace")]
    pub db_namespace: String,
    /// Database name (`DB_DATABASE`).
    #[serde(default = "default_db_database")]
    pub db_database: String,
    /// Chats whose traffic feeds the dispute detector (`MONITORED_CHAT_IDS`).
    #[serde(default)]
    pub monitored_chat_ids: Vec<i64>,
    /// Cooldown after an alert, in seconds (`DISPUTE_TIMEOUT_SECS`).
    #[serde(default = "default_dispute_timeout_secs")]
    pub dispute_timeout_secs: u64,
    /// Burst-detection horizon, in seconds (`MESSAGE_WINDOW_SECS`).
    #[serde(default = "default_message_window_secs")]
    pub message_window_secs: u64,
    /// Number of messages within the window that counts as a burst (`MIN_MESSAGES`).
    #[serde(default = "default_min_messages")]
    pub min_messages: usize,
    /// Substrings that mark a message as argumentative (`DISPUTE_PHRASES`).
    #[serde(default = "default_dispute_phrases")]
    pub dispute_phrases: Vec<String>,
    /// Whether dispute phrases match regardless of case (`DISPUTE_PHRASES_CASE_INSENSITIVE`).
    #[serde(default = "default_true")]
    pub dispute_phrases_case_insensitive: bool,
    /// Marker that manually restarts the cooldown (`DISPUTE_RESET_MARKER`).
    #[serde(default = "default_dispute_reset_marker")]
    pub dispute_reset_marker: String,
    /// Text posted when a dispute is detected (`DISPUTE_ALERT_TEXT`).
    #[serde(default = "default_dispute_alert_text")]
    pub dispute_alert_text: String,
    /// Substrings that wake the sticker responder (`KEYWORDS`).
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    /// Whether keywords match regardless of case (`KEYWORDS_CASE_INSENSITIVE`).
    #[serde(default)]
    pub keywords_case_insensitive: bool,
    /// Chance in percent (0 to 100) of reacting to a keyword without a question mark (`RESPONSE_CHANCE_PERCENT`).
    #[serde(default = "default_response_chance_percent")]
    pub response_chance_percent: u8,
    /// Sticker references the responder picks from (`STICKER_ASSETS`).
    #[serde(default)]
    pub sticker_assets: Vec<String>,
    /// Card image references for the bridge-or-park command (`CARD_ASSETS`).
    #[serde(default)]
    pub card_assets: Vec<String>,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            telegram_bot_token: String::new(),
            telegram_api_base: default_telegram_api_base(),
            telegram_poll_timeout_secs: default_telegram_poll_timeout_secs(),
            db_endpoint: "mem://".to_string(),
            db_username: None,
            db_password: None,
            db_namespace: default_db_namespace(),
            db_database: default_db_database(),
            monitored_chat_ids: Vec::new(),
            dispute_timeout_secs: default_dispute_timeout_secs(),
            message_window_secs: default_message_window_secs(),
            min_messages: default_min_messages(),
            dispute_phrases: default_dispute_phrases(),
            dispute_phrases_case_insensitive: true,
            dispute_reset_marker: default_dispute_reset_marker(),
            dispute_alert_text: default_dispute_alert_text(),
            keywords: default_keywords(),
            keywords_case_insensitive: false,
            response_chance_percent: default_response_chance_percent(),
            sticker_assets: Vec::new(),
            card_assets: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut env = config::Environment::default().prefix("ZELDOS_BOT").try_parsing(true).list_separator(",");
        for key in LIST_KEYS {
            env = env.with_list_parse_key(key);
        }

        let mut cfg = config::Config::builder();

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        // Environment variables win over the file.
        cfg = cfg.add_source(env);

        let inner: ConfigInner = cfg
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| BotError::Configuration(e.to_string()))?;

        let result = Config::from(inner);
        result.validate()?;

        Ok(result)
    }

    /// Checks the loaded values for anything that would make the bot misbehave at runtime.
    pub fn validate(&self) -> Res<()> {
        if self.telegram_bot_token.trim().is_empty() {
            return Err(BotError::Configuration("Telegram bot token must be set.".into()).into());
        }

        if self.db_endpoint.trim().is_empty() {
            return Err(BotError::Configuration("Database endpoint must be set.".into()).into());
        }

        if self.response_chance_percent > 100 {
            return Err(BotError::Configuration("Response chance must be between 0 and 100.".into()).into());
        }

        if self.message_window_secs == 0 {
            return Err(BotError::Configuration("Message window must be at least one second.".into()).into());
        }

        if self.min_messages == 0 {
            return Err(BotError::Configuration("Minimum message count must be at least one.".into()).into());
        }

        if self.dispute_reset_marker.trim().is_empty() {
            return Err(BotError::Configuration("Dispute reset marker must not be empty.".into()).into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ConfigInner {
        ConfigInner {
            telegram_bot_token: "123:abc".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_validate() {
        let config = Config::from(valid());

        assert!(config.validate().is_ok());
        assert_eq!(config.min_messages, 20);
        assert_eq!(config.message_window_secs, 300);
        assert_eq!(config.dispute_timeout_secs, 3600);
        assert_eq!(config.response_chance_percent, 50);
        assert!(config.dispute_phrases_case_insensitive);
        assert!(!config.keywords_case_insensitive);
    }

    #[test]
    fn missing_token_is_a_configuration_error() {
        let config = Config::from(ConfigInner::default());

        let err = config.validate().unwrap_err();
        assert!(matches!(err.downcast_ref::<BotError>(), Some(BotError::Configuration(_))));
    }

    #[test]
    fn chance_above_one_hundred_is_rejected() {
        let config = Config::from(ConfigInner {
            response_chance_percent: 101,
            ..valid()
        });

        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_thresholds_are_rejected() {
        assert!(Config::from(ConfigInner { min_messages: 0, ..valid() }).validate().is_err());
        assert!(Config::from(ConfigInner { message_window_secs: 0, ..valid() }).validate().is_err());
    }

    #[test]
    fn loads_from_toml_file() {
        let path = std::env::temp_dir().join(format!("zeldos-bot-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
telegram_bot_token = "123:abc"
db_endpoint = "mem://"
monitored_chat_ids = [-1001, -1002]
min_messages = 5
keywords = ["link"]
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.monitored_chat_ids, vec![-1001, -1002]);
        assert_eq!(config.min_messages, 5);
        assert_eq!(config.keywords, vec!["link".to_string()]);
        assert_eq!(config.dispute_reset_marker, "#срач");
    }
}
