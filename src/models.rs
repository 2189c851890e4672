//! Data models and structures
//!
//! Defines runtime configuration and the JSON bodies exchanged with
//! browser clients of the proxy.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://yunwu.ai";
pub const DEFAULT_MODEL: &str = "gpt-4o-image-vip";
pub const DEFAULT_STYLE: &str = "Studio Ghibli";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_JOB_TTL_SECS: u64 = 3600;

/// Successful synchronous proxy response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub image_url: String,
}

/// Error body returned by every proxy endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub style_name: String,
    pub bind_addr: String,
    pub production: bool,
    pub job_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            style_name: DEFAULT_STYLE.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            production: false,
            job_ttl: Duration::from_secs(DEFAULT_JOB_TTL_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            api_key: var("YUNWU_API_KEY"),
            base_url: var("COMPLETION_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: var("COMPLETION_MODEL").unwrap_or(defaults.model),
            timeout: Duration::from_secs(parse_secs(
                "COMPLETION_TIMEOUT_SECS",
                var("COMPLETION_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?),
            style_name: var("STYLE_NAME").unwrap_or(defaults.style_name),
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            production: var("APP_ENV").is_some_and(|env| env.eq_ignore_ascii_case("production")),
            job_ttl: Duration::from_secs(parse_secs(
                "JOB_TTL_SECS",
                var("JOB_TTL_SECS"),
                DEFAULT_JOB_TTL_SECS,
            )?),
        })
    }

    /// The completion credential, or a configuration error when unset.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::Configuration("YUNWU_API_KEY not set".to_string()))
    }
}

fn parse_secs(key: &str, value: Option<String>, default: u64) -> Result<u64> {
    match value {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(Error::Configuration(format!(
                "{} must be a positive number of seconds, got '{}'",
                key, raw
            ))),
        },
    }
}
