use super::consts;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    base_url: String,
    timeout: Option<Duration>,
}

pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    // Sets the default values. No timeout: a hung request simply never resolves.
    pub fn new() -> Self {
        Self {
            base_url: consts::BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn query_url(&self) -> String {
        format!("{}{}", self.base_url, consts::QUERY_PATH)
    }

    pub fn welcome_url(&self) -> String {
        format!("{}{}", self.base_url, consts::WELCOME_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_service() {
        let config = Config::new();
        assert_eq!(config.query_url(), "http://localhost:8000/query");
        assert_eq!(config.welcome_url(), "http://localhost:8000/");
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_builder_strips_trailing_slash() {
        let config = Config::builder()
            .with_base_url("https://trips.example.com/api/")
            .with_timeout(Some(Duration::from_secs(5)))
            .build();
        assert_eq!(config.query_url(), "https://trips.example.com/api/query");
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    }
}
