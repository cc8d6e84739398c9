// src/config.rs
use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};
use log::warn;

use crate::models::Language;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone)]
pub struct Settings {
    // Network
    pub api_base_url: String,
    pub analysis_base_url: String,
    pub http_timeout: Duration,
    pub analysis_timeout: Duration,

    // Store behaviour
    pub default_language: Language,
    pub allow_mock_fallback: bool,
    pub persona_tick: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            analysis_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(30),
            analysis_timeout: Duration::from_secs(180),
            default_language: Language::En,
            allow_mock_fallback: true,
            persona_tick: Duration::from_millis(1500),
        }
    }
}

impl Settings {
    /// Load settings from the process environment. Call `dotenv().ok()` first
    /// if a `.env` file should be honoured.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| env::var(key).ok())
    }

    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| clean(lookup(key));

        let get_secs = |key: &str, default: u64| -> Result<u64> {
            match get(key) {
                None => Ok(default),
                Some(v) => v
                    .parse::<u64>()
                    .map_err(|e| anyhow!("{key} invalid integer: {e}")),
            }
        };

        let get_bool = |key: &str, default: bool| -> Result<bool> {
            match get(key) {
                None => Ok(default),
                Some(v) => match v.to_lowercase().as_str() {
                    "1" | "true" | "yes" | "y" | "on" => Ok(true),
                    "0" | "false" | "no" | "n" | "off" => Ok(false),
                    other => Err(anyhow!("{key} invalid boolean: {other}")),
                },
            }
        };

        let api_base_url = get("API_BASE_URL").unwrap_or_else(|| {
            warn!("API_BASE_URL not set, defaulting to {}", DEFAULT_API_BASE_URL);
            DEFAULT_API_BASE_URL.to_string()
        });
        let analysis_base_url = get("ANALYSIS_BASE_URL").unwrap_or_else(|| api_base_url.clone());

        let default_language = match get("DEFAULT_LANGUAGE") {
            None => Language::En,
            Some(code) => code.parse::<Language>().map_err(|e| anyhow!("DEFAULT_LANGUAGE {e}"))?,
        };

        let settings = Settings {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            analysis_base_url: analysis_base_url.trim_end_matches('/').to_string(),
            http_timeout: Duration::from_secs(get_secs("HTTP_TIMEOUT_SECS", 30)?),
            analysis_timeout: Duration::from_secs(get_secs("ANALYSIS_TIMEOUT_SECS", 180)?),
            default_language,
            allow_mock_fallback: get_bool("ALLOW_MOCK_FALLBACK", true)?,
            persona_tick: Duration::from_millis(get_secs("PERSONA_TICK_MS", 1500)?),
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, url) in [
            ("API_BASE_URL", &self.api_base_url),
            ("ANALYSIS_BASE_URL", &self.analysis_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow!("{key} must be an http(s) URL (got {url})"));
            }
        }
        if self.http_timeout.is_zero() || self.analysis_timeout.is_zero() {
            return Err(anyhow!("timeouts must be greater than zero"));
        }
        if self.persona_tick.is_zero() {
            return Err(anyhow!("PERSONA_TICK_MS must be greater than zero"));
        }
        Ok(())
    }
}
