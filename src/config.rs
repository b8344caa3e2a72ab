// src/config.rs
use crate::errors::CritiqueError;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub bind_addr: String,
}

impl Config {
    /// Reads the process environment once at startup.
    pub fn from_env() -> Result<Self, CritiqueError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CritiqueError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = non_blank(&lookup, "GEMINI_API_KEY").ok_or_else(|| {
            CritiqueError::Configuration(
                "GEMINI_API_KEY is not set, check your environment variables".to_string(),
            )
        })?;

        let request_timeout =
            Duration::from_secs(parse_or(&lookup, "ADCRITIC_REQUEST_TIMEOUT_SECS", 60u64)?);
        if request_timeout.is_zero() {
            return Err(CritiqueError::Configuration(
                "ADCRITIC_REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            model: non_blank(&lookup, "GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: non_blank(&lookup, "GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout,
            max_retries: parse_or(&lookup, "ADCRITIC_MAX_RETRIES", 0u32)?,
            retry_backoff: Duration::from_millis(parse_or(
                &lookup,
                "ADCRITIC_RETRY_BACKOFF_MS",
                500u64,
            )?),
            bind_addr: non_blank(&lookup, "ADCRITIC_BIND_ADDR")
                .unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        })
    }
}

/// A set but blank variable counts as unset.
fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, CritiqueError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match non_blank(lookup, key) {
        Some(raw) => raw.parse().map_err(|_| {
            CritiqueError::Configuration(format!("{} has an invalid value '{}'", key, raw))
        }),
        None => Ok(default),
    }
}
