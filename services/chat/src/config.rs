//! Application Configuration Module
//!
//! Loads settings for the chat client from environment variables (and an optional `.env`
//! file) into a single struct that `main` hands to the transport and logging setup.

use dialogue_client::consts::BASE_URL;
use dialogue_client::types::DEMO_USER_ID;
use std::env;
use std::time::Duration;
use tracing::Level;

pub const URL_VAR: &str = "TRIP_ASSISTANT_URL";
pub const USER_ID_VAR: &str = "TRIP_ASSISTANT_USER_ID";
pub const TIMEOUT_VAR: &str = "TRIP_ASSISTANT_TIMEOUT_SECS";
pub const LOG_LEVEL_VAR: &str = "RUST_LOG";

/// How long the startup greeting probe may take before it is skipped.
pub const WELCOME_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Holds all configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub user_id: String,
    pub request_timeout: Option<Duration>,
    pub log_level: Level,
}

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// *   `TRIP_ASSISTANT_URL`: Base URL of the dialogue service. Defaults to "http://localhost:8000".
    /// *   `TRIP_ASSISTANT_USER_ID`: Session identifier sent with every query. Defaults to "demo_user".
    /// *   `TRIP_ASSISTANT_TIMEOUT_SECS`: (Optional) Per-request timeout. Unset means wait forever.
    /// *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file. This is useful for local development and is ignored if not present.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(URL_VAR).unwrap_or_else(|| BASE_URL.to_string());
        validate_base_url(&base_url)?;

        let user_id = lookup(USER_ID_VAR).unwrap_or_else(|| DEMO_USER_ID.to_string());
        if user_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                USER_ID_VAR.to_string(),
                "must not be empty".to_string(),
            ));
        }

        let request_timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => Some(parse_timeout(&raw)?),
            None => None,
        };

        let log_level_str = lookup(LOG_LEVEL_VAR).unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        Ok(Self {
            base_url,
            user_id,
            request_timeout,
            log_level,
        })
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        user_id: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(base_url) = base_url {
            validate_base_url(&base_url)?;
            self.base_url = base_url;
        }
        if let Some(user_id) = user_id {
            if user_id.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "--user-id".to_string(),
                    "must not be empty".to_string(),
                ));
            }
            self.user_id = user_id;
        }
        Ok(self)
    }
}

fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(
            URL_VAR.to_string(),
            format!("'{base_url}' is not an http(s) URL"),
        ))
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue(
            TIMEOUT_VAR.to_string(),
            format!("'{raw}' is not a positive number of seconds"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.user_id, "demo_user");
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn test_reads_all_variables() {
        let config = Config::from_lookup(lookup_from(&[
            (URL_VAR, "https://trips.example.com"),
            (USER_ID_VAR, "traveller-7"),
            (TIMEOUT_VAR, "30"),
            (LOG_LEVEL_VAR, "debug"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://trips.example.com");
        assert_eq!(config.user_id, "traveller-7");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Config::from_lookup(lookup_from(&[(URL_VAR, "localhost:8000")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == URL_VAR));

        let err = Config::from_lookup(lookup_from(&[(USER_ID_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == USER_ID_VAR));

        for bad in ["0", "-3", "soon"] {
            let err = Config::from_lookup(lookup_from(&[(TIMEOUT_VAR, bad)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == TIMEOUT_VAR));
        }

        let err = Config::from_lookup(lookup_from(&[(LOG_LEVEL_VAR, "chatty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(level) if level == "chatty"));
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = Config::from_lookup(lookup_from(&[(USER_ID_VAR, "from-env")]))
            .unwrap()
            .with_overrides(Some("http://10.0.0.2:8000".to_string()), None)
            .unwrap();
        assert_eq!(config.base_url, "http://10.0.0.2:8000");
        assert_eq!(config.user_id, "from-env");

        let err = Config::from_lookup(lookup_from(&[]))
            .unwrap()
            .with_overrides(None, Some(String::new()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(..)));
    }
}
