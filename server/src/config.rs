use serde::Deserialize;

/// Process configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Comma-separated list of origins allowed by CORS.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,

    /// Outbound events buffered per connection before new ones are dropped.
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,

    /// Largest WebSocket message accepted from a client, in bytes.
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable error: {0}")]
    Env(#[from] envy::Error),
    #[error("OUTBOX_CAPACITY must be greater than zero")]
    ZeroOutboxCapacity,
    #[error("MAX_FRAME_SIZE must be greater than zero")]
    ZeroMaxFrameSize,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env file loaded: {}", e);
        }
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)?;
        if config.outbox_capacity == 0 {
            return Err(ConfigError::ZeroOutboxCapacity);
        }
        if config.max_frame_size == 0 {
            return Err(ConfigError::ZeroMaxFrameSize);
        }
        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            outbox_capacity: default_outbox_capacity(),
            max_frame_size: default_max_frame_size(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origins() -> String {
    "http://localhost:3000,http://localhost:5173".to_string()
}

fn default_outbox_capacity() -> usize {
    64
}

fn default_max_frame_size() -> usize {
    1_000_000
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn it_uses_defaults_for_empty_environment() {
        let config = Config::from_vars(vars(&[])).expect("");
        assert_eq!(config.server_address(), "127.0.0.1:5000");
        assert_eq!(config.outbox_capacity, 64);
        assert_eq!(config.max_frame_size, 1_000_000);
        assert_eq!(
            config.cors_origin_list(),
            vec!["http://localhost:3000", "http://localhost:5173"]
        );
    }

    #[test]
    fn it_reads_overrides() {
        let config = Config::from_vars(vars(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("CORS_ORIGINS", " https://a.example , ,https://b.example"),
            ("OUTBOX_CAPACITY", "8"),
            ("MAX_FRAME_SIZE", "4194304"),
        ]))
        .expect("");
        assert_eq!(config.server_address(), "0.0.0.0:8080");
        assert_eq!(config.outbox_capacity, 8);
        assert_eq!(config.max_frame_size, 4_194_304);
        assert_eq!(
            config.cors_origin_list(),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn it_rejects_invalid_port() {
        let result = Config::from_vars(vars(&[("PORT", "not-a-port")]));
        assert!(matches!(result, Err(ConfigError::Env(_))));
    }

    #[test]
    fn it_rejects_zero_outbox_capacity() {
        let result = Config::from_vars(vars(&[("OUTBOX_CAPACITY", "0")]));
        assert!(matches!(result, Err(ConfigError::ZeroOutboxCapacity)));
    }

    #[test]
    fn it_rejects_zero_max_frame_size() {
        let result = Config::from_vars(vars(&[("MAX_FRAME_SIZE", "0")]));
        assert!(matches!(result, Err(ConfigError::ZeroMaxFrameSize)));
    }
}
