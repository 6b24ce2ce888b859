//! Action server configuration
//!
//! Read once from the environment (after `.env` is loaded) and shared
//! immutably with every action.

use crate::error::ActionServerError;
use crate::Result;
use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api/transactions";
pub const DEFAULT_MODEL: &str = "llama3";
pub const DEFAULT_OLLAMA_BIN: &str = "ollama";
pub const DEFAULT_MERN_API_URL: &str = "http://localhost:5000/api/chatbot/log";
pub const DEFAULT_PORT: u16 = 5055;

const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct ActionServerConfig {
    /// Base URL of the finance backend, without trailing slash
    pub api_url: String,
    /// Token used when the conversation carries none
    pub default_token: String,
    pub model: String,
    pub ollama_bin: String,
    /// Exchange logging endpoint; empty disables logging
    pub mern_api_url: String,
    pub backend_timeout: Duration,
    pub log_timeout: Duration,
    pub port: u16,
}

impl Default for ActionServerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            default_token: String::new(),
            model: DEFAULT_MODEL.to_string(),
            ollama_bin: DEFAULT_OLLAMA_BIN.to_string(),
            mern_api_url: DEFAULT_MERN_API_URL.to_string(),
            backend_timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
            log_timeout: Duration::from_millis(DEFAULT_LOG_TIMEOUT_MS),
            port: DEFAULT_PORT,
        }
    }
}

impl ActionServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend_timeout = match lookup("BACKEND_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number("BACKEND_TIMEOUT_SECS", &raw)?),
            None => defaults.backend_timeout,
        };

        let log_timeout = match lookup("LOG_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(parse_number("LOG_TIMEOUT_MS", &raw)?),
            None => defaults.log_timeout,
        };

        let port = match lookup("ACTION_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                ActionServerError::ConfigError(format!("invalid port '{}': {}", raw, e))
            })?,
            None => defaults.port,
        };

        Ok(Self {
            api_url: lookup("API_URL")
                .unwrap_or(defaults.api_url)
                .trim_end_matches('/')
                .to_string(),
            default_token: lookup("DEFAULT_TOKEN").unwrap_or(defaults.default_token),
            model: lookup("OLLAMA_MODEL").unwrap_or(defaults.model),
            ollama_bin: lookup("OLLAMA_BIN").unwrap_or(defaults.ollama_bin),
            mern_api_url: lookup("MERN_API_URL").unwrap_or(defaults.mern_api_url),
            backend_timeout,
            log_timeout,
            port,
        })
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|e| {
        ActionServerError::ConfigError(format!("invalid {} '{}': {}", key, raw, e))
    })
}
