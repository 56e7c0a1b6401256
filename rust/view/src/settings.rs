use crate::actions::{RaiseSchedule, RaiseTier};
use crate::markup::is_special;
use pokerbot_engine::player::Money;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const ENV_CURRENCY: &str = "POKERBOT_CURRENCY";
pub const ENV_RAISE_SMALL: &str = "POKERBOT_RAISE_SMALL";
pub const ENV_RAISE_NORMAL: &str = "POKERBOT_RAISE_NORMAL";
pub const ENV_RAISE_BIG: &str = "POKERBOT_RAISE_BIG";
pub const ENV_TELEGRAM_TOKEN: &str = "POKERBOT_TELEGRAM_TOKEN";
pub const ENV_TELEGRAM_API_URL: &str = "POKERBOT_TELEGRAM_API_URL";
pub const ENV_TELEGRAM_TIMEOUT: &str = "POKERBOT_TELEGRAM_TIMEOUT_SECS";

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How game messages look: money suffix and quick-raise amounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ViewSettings {
    /// Appended to every amount, on controls and in text
    pub currency_marker: String,
    /// Amounts offered on the quick-raise row
    pub raise: RaiseSchedule,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            currency_marker: "$".to_string(),
            raise: RaiseSchedule::default(),
        }
    }
}

impl ViewSettings {
    /// Validate settings values
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.currency_marker.trim().is_empty() {
            return Err(SettingsError::InvalidValue(
                "currency_marker cannot be empty".to_string(),
            ));
        }
        if let Some(c) = self
            .currency_marker
            .chars()
            .find(|&c| is_special(c) || c.is_control())
        {
            return Err(SettingsError::InvalidValue(format!(
                "currency_marker cannot contain {c:?}"
            )));
        }
        self.raise.validate()
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, SettingsError> {
        let settings: ViewSettings = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults, overridden by the file at `path` (if any), then by the
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str(&raw)?
            }
            None => ViewSettings::default(),
        };
        settings.apply_env()?;
        settings.validate()?;
        tracing::debug!(
            currency_marker = %settings.currency_marker,
            raise_small = settings.raise.amount(RaiseTier::Small),
            raise_normal = settings.raise.amount(RaiseTier::Normal),
            raise_big = settings.raise.amount(RaiseTier::Big),
            "view settings loaded"
        );
        Ok(settings)
    }

    fn apply_env(&mut self) -> Result<(), SettingsError> {
        if let Ok(marker) = std::env::var(ENV_CURRENCY) {
            self.currency_marker = marker;
        }
        let small = env_money(ENV_RAISE_SMALL)?;
        let normal = env_money(ENV_RAISE_NORMAL)?;
        let big = env_money(ENV_RAISE_BIG)?;
        if small.is_some() || normal.is_some() || big.is_some() {
            // all three overrides land before the schedule is checked
            self.raise = RaiseSchedule::new(
                small.unwrap_or(self.raise.amount(RaiseTier::Small)),
                normal.unwrap_or(self.raise.amount(RaiseTier::Normal)),
                big.unwrap_or(self.raise.amount(RaiseTier::Big)),
            )?;
        }
        Ok(())
    }
}

fn env_money(key: &str) -> Result<Option<Money>, SettingsError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SettingsError::InvalidValue(format!("{key} must be a number, got {raw:?}"))),
        Err(_) => Ok(None),
    }
}

/// Connection settings for the Telegram Bot API.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub token: String,
    pub api_url: String,
    pub request_timeout: Duration,
}

// keeps the bot token out of logs
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self, SettingsError> {
        let token = std::env::var(ENV_TELEGRAM_TOKEN)
            .map_err(|_| SettingsError::Missing(ENV_TELEGRAM_TOKEN))?;
        let mut config = Self::new(token);
        if let Ok(url) = std::env::var(ENV_TELEGRAM_API_URL) {
            config.api_url = url;
        }
        if let Ok(raw) = std::env::var(ENV_TELEGRAM_TIMEOUT) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                SettingsError::InvalidValue(format!(
                    "{ENV_TELEGRAM_TIMEOUT} must be a number, got {raw:?}"
                ))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.token.trim().is_empty() {
            return Err(SettingsError::InvalidValue(
                "telegram token cannot be empty".to_string(),
            ));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(SettingsError::InvalidValue(format!(
                "telegram api url must be http(s), got {:?}",
                self.api_url
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(SettingsError::InvalidValue(
                "telegram request timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Bot API endpoint for `method`, e.g. `sendMessage`.
    pub fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_url.trim_end_matches('/'),
            self.token,
            method
        )
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for key in [
            ENV_CURRENCY,
            ENV_RAISE_SMALL,
            ENV_RAISE_NORMAL,
            ENV_RAISE_BIG,
            ENV_TELEGRAM_TOKEN,
            ENV_TELEGRAM_API_URL,
            ENV_TELEGRAM_TIMEOUT,
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = ViewSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.currency_marker, "$");
        assert_eq!(settings.raise, RaiseSchedule::default());
    }

    #[test]
    fn validates_currency_marker() {
        for marker in ["", "  ", "*", "$.", "\n"] {
            let settings = ViewSettings {
                currency_marker: marker.to_string(),
                ..Default::default()
            };
            assert!(settings.validate().is_err(), "{marker:?}");
        }
        let settings = ViewSettings {
            currency_marker: " chips".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn parses_partial_toml() {
        let settings = ViewSettings::from_toml_str(
            r#"
            currency_marker = "€"
            "#,
        )
        .expect("parse");
        assert_eq!(settings.currency_marker, "€");
        assert_eq!(settings.raise, RaiseSchedule::default());

        let settings = ViewSettings::from_toml_str(
            r#"
            [raise]
            small = 20
            normal = 40
            big = 100
            "#,
        )
        .expect("parse");
        assert_eq!(settings.raise.amount(RaiseTier::Big), 100);
    }

    #[test]
    fn rejects_invalid_toml() {
        assert!(matches!(
            ViewSettings::from_toml_str("currency = 5"),
            Err(SettingsError::Parse(_))
        ));
        // the schedule is checked while parsing
        let err = ViewSettings::from_toml_str("[raise]\nsmall = 30\nnormal = 20\nbig = 10")
            .expect_err("descending schedule");
        assert!(matches!(err, SettingsError::Parse(_)));
        assert!(err.to_string().contains("strictly"), "{err}");
        assert!(matches!(
            ViewSettings::from_toml_str("[raise]\nsmall = 0\nnormal = 0\nbig = 0"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    #[serial]
    fn env_overrides_file() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "currency_marker = \"€\"\n[raise]\nsmall = 5\nnormal = 15\nbig = 45")
            .expect("write");

        std::env::set_var(ENV_RAISE_BIG, "90");
        let settings = ViewSettings::load(Some(file.path())).expect("load");
        clear_env();

        assert_eq!(settings.currency_marker, "€");
        assert_eq!(
            settings.raise,
            RaiseSchedule::new(5, 15, 90).expect("schedule")
        );
    }

    #[test]
    #[serial]
    fn env_values_are_validated() {
        clear_env();
        std::env::set_var(ENV_RAISE_SMALL, "lots");
        let result = ViewSettings::load(None);
        clear_env();
        assert!(matches!(result, Err(SettingsError::InvalidValue(_))));

        std::env::set_var(ENV_RAISE_SMALL, "60");
        let result = ViewSettings::load(None);
        clear_env();
        assert!(matches!(result, Err(SettingsError::InvalidValue(_))));
    }

    #[test]
    #[serial]
    fn env_overrides_apply_together() {
        clear_env();
        std::env::set_var(ENV_RAISE_SMALL, "60");
        std::env::set_var(ENV_RAISE_NORMAL, "70");
        std::env::set_var(ENV_RAISE_BIG, "90");
        let result = ViewSettings::load(None);
        clear_env();
        assert_eq!(
            result.expect("load").raise,
            RaiseSchedule::new(60, 70, 90).expect("schedule")
        );
    }

    #[test]
    #[serial]
    fn missing_file_is_an_io_error() {
        clear_env();
        let result = ViewSettings::load(Some(Path::new("/nonexistent/pokerbot.toml")));
        assert!(matches!(result, Err(SettingsError::Io(_))));
    }

    #[test]
    #[serial]
    fn telegram_config_requires_token() {
        clear_env();
        assert!(matches!(
            TelegramConfig::from_env(),
            Err(SettingsError::Missing(ENV_TELEGRAM_TOKEN))
        ));

        std::env::set_var(ENV_TELEGRAM_TOKEN, "123:abc");
        std::env::set_var(ENV_TELEGRAM_TIMEOUT, "3");
        let config = TelegramConfig::from_env();
        clear_env();

        let config = config.expect("config");
        assert_eq!(config.api_url, DEFAULT_TELEGRAM_API_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn telegram_method_urls() {
        let mut config = TelegramConfig::new("123:abc");
        config.api_url = "http://127.0.0.1:8081/".to_string();
        assert_eq!(
            config.method_url("sendMessage"),
            "http://127.0.0.1:8081/bot123:abc/sendMessage"
        );
        assert!(!format!("{config:?}").contains("123:abc"));
    }

    #[test]
    fn telegram_config_validation() {
        assert!(TelegramConfig::new("").validate().is_err());
        let mut config = TelegramConfig::new("t");
        config.api_url = "ftp://example.org".to_string();
        assert!(config.validate().is_err());
        let mut config = TelegramConfig::new("t");
        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
