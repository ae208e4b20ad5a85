//! Configuration management for taskpilot.
//!
//! Configuration can be set via environment variables:
//! - `OPENROUTER_API_KEY` - Required. Your OpenRouter API key.
//! - `COMMAND_MODEL` - Optional. Model used to interpret commands. Defaults to `openai/gpt-4o-mini`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `LLM_TIMEOUT_SECS` - Optional. Timeout for one interpretation request. Defaults to `30`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenRouter API key
    pub api_key: String,

    /// Model used to interpret free-text commands (OpenRouter format)
    pub command_model: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Timeout for a single interpretation request, in seconds
    pub llm_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let command_model =
            std::env::var("COMMAND_MODEL").unwrap_or_else(|_| "openai/gpt-4o-mini".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let llm_timeout_secs = std::env::var("LLM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("LLM_TIMEOUT_SECS".to_string(), format!("{}", e))
            })?;

        Ok(Self {
            api_key,
            command_model,
            host,
            port,
            llm_timeout_secs,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, command_model: String) -> Self {
        Self {
            api_key,
            command_model,
            host: "127.0.0.1".to_string(),
            port: 3000,
            llm_timeout_secs: 30,
        }
    }
}
