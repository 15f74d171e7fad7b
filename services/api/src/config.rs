//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// When unset the service runs on the in-memory session store.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub chat_model: String,
    pub question_model: String,
    pub total_questions: usize,
    pub question_time_limit: Duration,
    pub session_ttl: Duration,
    /// Bearer token protecting the admin surface; unset leaves it closed.
    pub admin_token: Option<String>,
    /// Remote interview backend for the runner binary. Unset selects the
    /// in-process engine.
    pub interview_api_url: Option<String>,
    pub autosave_path: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL").ok();

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Keys (as optional) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Interview Settings ---
        let chat_model =
            std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());
        let question_model =
            std::env::var("QUESTION_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        let total_questions = parse_var("TOTAL_QUESTIONS", 10usize)?;
        let question_time_limit =
            Duration::from_secs(parse_var("QUESTION_TIME_LIMIT_SECS", 90u64)?);
        let session_ttl = Duration::from_secs(parse_var("SESSION_TTL_SECS", 3600u64)?);

        let admin_token = std::env::var("ADMIN_TOKEN").ok();
        let interview_api_url = std::env::var("INTERVIEW_API_URL").ok();
        let autosave_path = std::env::var("AUTOSAVE_PATH")
            .unwrap_or_else(|_| ".interview_autosave.json".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openai_api_key,
            chat_model,
            question_model,
            total_questions,
            question_time_limit,
            session_ttl,
            admin_token,
            interview_api_url,
            autosave_path,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(name.to_string(), raw)),
        Err(_) => Ok(default),
    }
}
