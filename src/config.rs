//! Runtime configuration
//!
//! Values come from the process environment (optionally seeded from a `.env`
//! file by the binaries) and can be overridden by CLI flags.

use crate::error::{AgentError, Result};
use crate::execution::ExecutionPolicy;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_DB_PATH: &str = "ecommerce.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Upper bound on the translation call, in seconds.
pub const MAX_TRANSLATION_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Gemini API key (`GOOGLE_GEMINI_API_KEY`)
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(MAX_TRANSLATION_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub bind_addr: String,
    pub policy: ExecutionPolicy,
    pub llm: LlmConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            policy: ExecutionPolicy::ReadOnly,
            llm: LlmConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.llm.api_key = lookup("GOOGLE_GEMINI_API_KEY").filter(|k| !k.trim().is_empty());
        if let Some(model) = lookup("GEMINI_MODEL").filter(|m| !m.is_empty()) {
            config.llm.model = model;
        }
        if let Some(url) = lookup("GEMINI_BASE_URL").filter(|u| !u.is_empty()) {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup("TRANSLATION_TIMEOUT_SECS") {
            config.llm.timeout = parse_timeout(&raw)?;
        }

        if let Some(path) = lookup("ECOM_DB_PATH").filter(|p| !p.is_empty()) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(addr) = lookup("ECOM_BIND_ADDR").filter(|a| !a.is_empty()) {
            config.bind_addr = addr;
        }
        if let Some(raw) = lookup("ECOM_ALLOW_WRITES") {
            if parse_bool("ECOM_ALLOW_WRITES", &raw)? {
                config.policy = ExecutionPolicy::Permissive;
            }
        }

        Ok(config)
    }
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    let secs: u64 = raw.trim().parse().map_err(|e| {
        AgentError::Config(format!("TRANSLATION_TIMEOUT_SECS must be an integer: {}", e))
    })?;

    if secs == 0 || secs > MAX_TRANSLATION_TIMEOUT_SECS {
        return Err(AgentError::Config(format!(
            "TRANSLATION_TIMEOUT_SECS must be between 1 and {} (got {})",
            MAX_TRANSLATION_TIMEOUT_SECS, secs
        )));
    }

    Ok(Duration::from_secs(secs))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(AgentError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}
