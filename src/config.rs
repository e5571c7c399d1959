use crate::model::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_API_BASE_URL: &str = "https://pricecompare-api-backend-2.onrender.com";
pub const MAX_HISTORY_DAYS: u32 = 365;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout_seconds: u64,
    pub user_agent: String,
    /// Days of mocked history shown per listing.
    pub history_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_seconds: 30,
            user_agent: format!("price-compare/{}", env!("CARGO_PKG_VERSION")),
            history_days: 30,
        }
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let mut config: AppConfig = serde_json::from_str(content)?;
    if config.history_days > MAX_HISTORY_DAYS {
        warn!(
            "history_days {} is over the limit, using {}",
            config.history_days, MAX_HISTORY_DAYS
        );
        config.history_days = MAX_HISTORY_DAYS;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg = parse_config(r#"{ "api_base_url": "http://localhost:5000/" }"#).unwrap();
        assert_eq!(cfg.api_base_url, "http://localhost:5000/");
        assert_eq!(cfg.request_timeout_seconds, 30);
        assert_eq!(cfg.history_days, 30);
    }

    #[test]
    fn caps_history_days() {
        let cfg = parse_config(r#"{ "history_days": 4000000000 }"#).unwrap();
        assert_eq!(cfg.history_days, MAX_HISTORY_DAYS);
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(parse_config("{ nope"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config("definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
