use serde::Deserialize;
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("environment variable {0} must hold the API access token")]
    MissingToken(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_address: String,
    pub database_path: String,
    /// Name of the environment variable that carries the bearer token.
    pub access_token_env: String,
    pub recent_install_days: i64,
    pub top_bundles_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            database_path: "data.db".to_string(),
            access_token_env: "BUNDLE_DASH_TOKEN".to_string(),
            recent_install_days: 30,
            top_bundles_limit: 10,
        }
    }
}

impl AppConfig {
    pub fn access_token(&self) -> Result<String, ConfigError> {
        match std::env::var(&self.access_token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(ConfigError::MissingToken(self.access_token_env.clone())),
        }
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
