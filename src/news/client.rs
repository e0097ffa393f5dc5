//! Spaceflight News API client.

use reqwest::Url;

use super::{Article, NewsPage, NewsQuery, NewsSource, PAGE_SIZE};
use crate::{error::FetchError, http::check_response};

#[derive(serde::Deserialize)]
struct ArticlesResponse {
    results: Vec<Article>,
}

#[derive(Debug, Clone)]
pub struct SpaceflightNewsClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl SpaceflightNewsClient {
    pub fn new(http: reqwest::Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    /// `GET {endpoint}?limit=&offset=[&search=]`
    pub fn request(&self, query: &NewsQuery) -> Result<reqwest::Request, FetchError> {
        let mut params = vec![
            ("limit", PAGE_SIZE.to_string()),
            ("offset", query.offset().to_string()),
        ];
        if let Some(term) = query.search_term() {
            params.push(("search", term.to_string()));
        }
        let request = self
            .http
            .get(self.endpoint.clone())
            .query(&params)
            .build()?;
        Ok(request)
    }
}

impl NewsSource for SpaceflightNewsClient {
    async fn fetch_page(&self, query: &NewsQuery) -> Result<NewsPage, FetchError> {
        let request = self.request(query)?;
        log::debug!("Fetching news: {}", request.url());

        let resp = check_response(self.http.execute(request).await?).await?;
        let data: ArticlesResponse = resp.json().await?;

        log::info!(
            "Fetched {} articles (page {})",
            data.results.len(),
            query.page_number
        );
        Ok(NewsPage::from_results(data.results))
    }
}
