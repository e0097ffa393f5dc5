//! NASA Astronomy Picture of the Day.

use std::future::Future;

use chrono::{NaiveDate, Utc};
use reqwest::Url;

use crate::{error::FetchError, http::check_response};

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct DailyImage {
    pub url: String,
    pub title: String,
    pub explanation: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub hdurl: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
}

impl DailyImage {
    /// Some days are videos rather than pictures.
    pub fn is_image(&self) -> bool {
        self.media_type.as_deref().map_or(true, |m| m == "image")
    }
}

pub trait DailyImageSource {
    fn fetch_daily_image(&self) -> impl Future<Output = Result<DailyImage, FetchError>> + Send;
}

#[derive(Debug, Clone)]
pub struct NasaApodClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl NasaApodClient {
    pub fn new(http: reqwest::Client, endpoint: Url, api_key: String) -> Self {
        Self {
            http,
            endpoint,
            api_key,
        }
    }

    pub fn request(&self) -> Result<reqwest::Request, FetchError> {
        let request = self
            .http
            .get(self.endpoint.clone())
            .query(&[("api_key", self.api_key.as_str())])
            .build()?;
        Ok(request)
    }
}

impl DailyImageSource for NasaApodClient {
    async fn fetch_daily_image(&self) -> Result<DailyImage, FetchError> {
        let request = self.request()?;
        log::debug!("Fetching the picture of the day from {}", self.endpoint);
        let resp = check_response(self.http.execute(request).await?).await?;
        Ok(resp.json().await?)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loaded(DailyImage),
    Failed(String),
}

/// Loads the daily image once per UTC day. Failures are kept as state rather
/// than returned, and a later call after a failure fetches again.
#[derive(Debug, Default)]
pub struct DailyImageLoader {
    state: LoadState,
    fetched_on: Option<NaiveDate>,
}

impl DailyImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn record(&self) -> Option<&DailyImage> {
        match &self.state {
            LoadState::Loaded(image) => Some(image),
            _ => None,
        }
    }

    pub async fn load<S: DailyImageSource>(&mut self, source: &S) -> &LoadState {
        self.load_on(source, Utc::now().date_naive()).await
    }

    /// Like [`Self::load`], with `today` deciding whether a loaded record
    /// is still current.
    pub async fn load_on<S: DailyImageSource>(&mut self, source: &S, today: NaiveDate) -> &LoadState {
        if let LoadState::Loaded(_) = self.state {
            if self.fetched_on == Some(today) {
                return &self.state;
            }
            log::debug!("Picture of the day is from an earlier day, fetching again");
        }

        self.state = match source.fetch_daily_image().await {
            Ok(image) => {
                log::info!("Loaded picture of the day: {} ({})", image.title, image.date);
                self.fetched_on = Some(today);
                LoadState::Loaded(image)
            }
            Err(e) => {
                log::error!("Error fetching APOD: {}", e);
                LoadState::Failed("Couldn't load today's picture. Please try again.".to_string())
            }
        };
        &self.state
    }
}
