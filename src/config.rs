use std::{path::PathBuf, time::Duration};

use reqwest::Url;

use crate::error::ConfigError;

/// NASA's public demonstration key, rate limited per IP.
pub const DEFAULT_API_KEY: &str = "DEMO_KEY";
pub const DEFAULT_APOD_URL: &str = "https://api.nasa.gov/planetary/apod";
pub const DEFAULT_NEWS_URL: &str = "https://api.spaceflightnewsapi.net/v4/articles";
pub const DEFAULT_QUIZ_ADVANCE_DELAY_MS: u64 = 1500;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub apod_url: Url,
    pub news_url: Url,
    pub quiz_advance_delay: Duration,
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    /// Reads the configuration from the process environment. A `.env` file is
    /// expected to be loaded beforehand.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = var("API_KEY").unwrap_or_else(|| DEFAULT_API_KEY.to_string());
        let apod_url = parse_url("APOD_URL", var("APOD_URL"), DEFAULT_APOD_URL)?;
        let news_url = parse_url("NEWS_URL", var("NEWS_URL"), DEFAULT_NEWS_URL)?;

        let delay_ms = match var("QUIZ_ADVANCE_DELAY_MS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: "QUIZ_ADVANCE_DELAY_MS",
                    value,
                })?,
            None => DEFAULT_QUIZ_ADVANCE_DELAY_MS,
        };

        Ok(Self {
            api_key,
            apod_url,
            news_url,
            quiz_advance_delay: Duration::from_millis(delay_ms),
            catalog_path: var("CATALOG_PATH").map(PathBuf::from),
        })
    }
}

fn parse_url(name: &'static str, value: Option<String>, default: &str) -> Result<Url, ConfigError> {
    let raw = value.as_deref().unwrap_or(default);
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
        name,
        message: e.to_string(),
    })
}
