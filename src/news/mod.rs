//! Paginated, filterable space-news feed.
//!
//! A [`NewsFeed`] holds the articles accumulated so far for one reader. Every
//! fetch goes through [`NewsFeed::begin`] and [`NewsFeed::complete`]: `begin`
//! hands out a sequence-numbered [`FeedRequest`], and `complete` only applies
//! a response whose sequence is still the latest one issued. Page 1 replaces
//! the held list, later pages append to it.

pub mod client;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::error::FetchError;

pub use client::SpaceflightNewsClient;

/// Articles per page.
pub const PAGE_SIZE: usize = 4;

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub summary: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub news_site: String,
}

/// Fixed topical filters, sent to the endpoint in place of free-text search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NewsCategory {
    SpaceX,
    Nasa,
    Mars,
    Moon,
    Iss,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 5] = [
        NewsCategory::SpaceX,
        NewsCategory::Nasa,
        NewsCategory::Mars,
        NewsCategory::Moon,
        NewsCategory::Iss,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NewsCategory::SpaceX => "SpaceX",
            NewsCategory::Nasa => "NASA",
            NewsCategory::Mars => "Mars",
            NewsCategory::Moon => "Moon",
            NewsCategory::Iss => "ISS",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub page_number: u32,
    pub category: Option<NewsCategory>,
    pub search_text: Option<String>,
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self::first_page(None, None)
    }
}

impl NewsQuery {
    pub fn first_page(category: Option<NewsCategory>, search_text: Option<String>) -> Self {
        let search_text = search_text
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            page_number: 1,
            category,
            search_text,
        }
    }

    pub fn next_page(&self) -> Self {
        Self {
            page_number: self.page_number + 1,
            ..self.clone()
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.page_number <= 1
    }

    /// Zero-based number of articles to skip.
    pub fn offset(&self) -> usize {
        self.page_number.saturating_sub(1) as usize * PAGE_SIZE
    }

    /// The single term sent to the endpoint. A selected category wins over
    /// the free-text search; the two are never combined.
    pub fn search_term(&self) -> Option<&str> {
        match self.category {
            Some(category) => Some(category.label()),
            None => self.search_text.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsPage {
    pub articles: Vec<Article>,
    pub has_more: bool,
}

impl NewsPage {
    /// A full page suggests there is more to load. This is a guess, the
    /// endpoint's total count is not consulted.
    pub fn from_results(articles: Vec<Article>) -> Self {
        let has_more = articles.len() >= PAGE_SIZE;
        Self { articles, has_more }
    }
}

/// Anything that can serve a page of articles.
pub trait NewsSource {
    fn fetch_page(
        &self,
        query: &NewsQuery,
    ) -> impl Future<Output = Result<NewsPage, FetchError>> + Send;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FeedStatus {
    #[default]
    Idle,
    /// First page outstanding; render placeholders.
    Loading,
    /// Next page outstanding; keep showing what is held.
    LoadingMore,
    Ready,
    Failed(String),
}

/// A query that has been issued but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    sequence: u64,
    query: NewsQuery,
}

impl FeedRequest {
    pub fn query(&self) -> &NewsQuery {
        &self.query
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewsFeed {
    articles: Vec<Article>,
    has_more: bool,
    status: FeedStatus,
    last_query: Option<NewsQuery>,
    issued: u64,
}

impl NewsFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    pub fn last_query(&self) -> Option<&NewsQuery> {
        self.last_query.as_ref()
    }

    pub fn category(&self) -> Option<NewsCategory> {
        self.last_query.as_ref().and_then(|q| q.category)
    }

    pub fn search_text(&self) -> Option<&str> {
        self.last_query.as_ref().and_then(|q| q.search_text.as_deref())
    }

    /// Number of placeholder slots to render while the first page loads.
    pub fn placeholder_slots(&self) -> usize {
        match self.status {
            FeedStatus::Loading => PAGE_SIZE,
            _ => 0,
        }
    }

    /// Whether "load more" should be offered.
    pub fn can_load_more(&self) -> bool {
        self.status == FeedStatus::Ready && self.has_more && !self.articles.is_empty()
    }

    pub fn begin(&mut self, query: NewsQuery) -> FeedRequest {
        self.issued += 1;
        self.status = if query.is_first_page() {
            FeedStatus::Loading
        } else {
            FeedStatus::LoadingMore
        };
        log::debug!(
            "News request #{}: page {}, term {:?}",
            self.issued,
            query.page_number,
            query.search_term()
        );
        self.last_query = Some(query.clone());
        FeedRequest {
            sequence: self.issued,
            query,
        }
    }

    /// Applies the outcome of `request`. Returns `false`, leaving the feed
    /// untouched, if a newer request has been issued since.
    pub fn complete(&mut self, request: &FeedRequest, result: &Result<NewsPage, FetchError>) -> bool {
        if request.sequence != self.issued {
            log::debug!(
                "Discarding news response #{} (latest is #{})",
                request.sequence,
                self.issued
            );
            return false;
        }

        match result {
            Ok(page) => {
                if request.query.is_first_page() {
                    self.articles = page.articles.clone();
                } else {
                    self.articles.extend(page.articles.iter().cloned());
                }
                self.has_more = page.has_more;
                self.status = FeedStatus::Ready;
            }
            Err(e) => {
                log::warn!("Error fetching space news: {}", e);
                self.status = FeedStatus::Failed(
                    "Failed to load articles. Please try again later.".to_string(),
                );
            }
        }
        true
    }

    pub async fn query<S: NewsSource>(
        &mut self,
        source: &S,
        query: NewsQuery,
    ) -> Result<NewsPage, FetchError> {
        let request = self.begin(query);
        let result = source.fetch_page(&request.query).await;
        self.complete(&request, &result);
        result
    }

    /// Query for a category change. Keeps the current search text.
    pub fn category_query(&self, category: Option<NewsCategory>) -> NewsQuery {
        NewsQuery::first_page(category, self.search_text().map(str::to_string))
    }

    /// Query for a search-text change. Keeps the current category.
    pub fn search_query(&self, text: Option<String>) -> NewsQuery {
        NewsQuery::first_page(self.category(), text)
    }

    pub fn next_page_query(&self) -> Option<NewsQuery> {
        if !self.can_load_more() {
            return None;
        }
        self.last_query.as_ref().map(NewsQuery::next_page)
    }

    /// The last query, unchanged, if it failed.
    pub fn retry_query(&self) -> Option<NewsQuery> {
        match self.status {
            FeedStatus::Failed(_) => self.last_query.clone(),
            _ => None,
        }
    }

    pub async fn select_category<S: NewsSource>(
        &mut self,
        source: &S,
        category: Option<NewsCategory>,
    ) -> Result<NewsPage, FetchError> {
        let query = self.category_query(category);
        self.query(source, query).await
    }

    pub async fn search<S: NewsSource>(
        &mut self,
        source: &S,
        text: Option<String>,
    ) -> Result<NewsPage, FetchError> {
        let query = self.search_query(text);
        self.query(source, query).await
    }

    /// Fetches the next page. `None` when there is nothing more to load.
    pub async fn load_more<S: NewsSource>(
        &mut self,
        source: &S,
    ) -> Option<Result<NewsPage, FetchError>> {
        let query = self.next_page_query()?;
        Some(self.query(source, query).await)
    }

    /// Re-issues the failed query. `None` when the feed is not in a failed state.
    pub async fn retry<S: NewsSource>(&mut self, source: &S) -> Option<Result<NewsPage, FetchError>> {
        let query = self.retry_query()?;
        Some(self.query(source, query).await)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;

    fn article(id: u64, title: &str) -> Article {
        Article {
            id,
            title: title.to_string(),
            url: format!("https://example.com/{id}"),
            image_url: String::new(),
            summary: String::new(),
            published_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            news_site: "Example".to_string(),
        }
    }

    fn articles(term: &str, first_id: u64, count: usize) -> Vec<Article> {
        (0..count as u64)
            .map(|i| article(first_id + i, &format!("{term} #{}", first_id + i)))
            .collect()
    }

    /// Serves canned pages keyed by (search term, page) and records every query.
    #[derive(Default)]
    struct StubSource {
        pages: HashMap<(Option<String>, u32), Vec<Article>>,
        failing: bool,
        seen: Mutex<Vec<NewsQuery>>,
    }

    impl StubSource {
        fn with_page(mut self, term: Option<&str>, page: u32, articles: Vec<Article>) -> Self {
            self.pages.insert((term.map(str::to_string), page), articles);
            self
        }
    }

    impl NewsSource for StubSource {
        fn fetch_page(
            &self,
            query: &NewsQuery,
        ) -> impl Future<Output = Result<NewsPage, FetchError>> + Send {
            self.seen.lock().unwrap().push(query.clone());
            let result = if self.failing {
                Err(FetchError::Api {
                    status: 500,
                    message: "boom".to_string(),
                })
            } else {
                let key = (query.search_term().map(str::to_string), query.page_number);
                Ok(NewsPage::from_results(
                    self.pages.get(&key).cloned().unwrap_or_default(),
                ))
            };
            async move { result }
        }
    }

    fn mars_source() -> StubSource {
        StubSource::default()
            .with_page(Some("Mars"), 1, articles("Mars", 1, PAGE_SIZE))
            .with_page(Some("Mars"), 2, articles("Mars", 100, 2))
            .with_page(Some("Moon"), 1, articles("Moon", 200, 3))
    }

    #[test]
    fn offset_is_zero_based() {
        let query = NewsQuery::first_page(None, None);
        assert_eq!(query.offset(), 0);
        assert_eq!(query.next_page().offset(), PAGE_SIZE);
        assert_eq!(query.next_page().next_page().offset(), 2 * PAGE_SIZE);
    }

    #[test]
    fn category_takes_precedence_over_search_text() {
        let query = NewsQuery::first_page(Some(NewsCategory::Iss), Some("docking".to_string()));
        assert_eq!(query.search_term(), Some("ISS"));

        let query = NewsQuery::first_page(None, Some("docking".to_string()));
        assert_eq!(query.search_term(), Some("docking"));

        let query = NewsQuery::first_page(None, Some("   ".to_string()));
        assert_eq!(query.search_term(), None);
    }

    #[test]
    fn category_labels_round_trip() {
        for category in NewsCategory::ALL {
            assert_eq!(NewsCategory::from_label(category.label()), Some(category));
        }
        assert_eq!(NewsCategory::from_label("Venus"), None);
    }

    #[test]
    fn has_more_is_false_only_for_short_pages() {
        assert!(NewsPage::from_results(articles("x", 0, PAGE_SIZE)).has_more);
        assert!(!NewsPage::from_results(articles("x", 0, PAGE_SIZE - 1)).has_more);
        assert!(!NewsPage::from_results(vec![]).has_more);
    }

    #[tokio::test]
    async fn second_page_appends_to_first() {
        let source = mars_source();
        let mut feed = NewsFeed::new();

        let first = feed
            .query(&source, NewsQuery::first_page(Some(NewsCategory::Mars), None))
            .await
            .unwrap();
        let second = feed
            .query(
                &source,
                NewsQuery {
                    page_number: 2,
                    category: Some(NewsCategory::Mars),
                    search_text: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(
            feed.articles().len(),
            first.articles.len() + second.articles.len()
        );
        assert_eq!(&feed.articles()[..PAGE_SIZE], first.articles.as_slice());
        assert_eq!(&feed.articles()[PAGE_SIZE..], second.articles.as_slice());
        assert!(!feed.has_more());
    }

    #[tokio::test]
    async fn changing_category_replaces_held_articles() {
        let source = mars_source();
        let mut feed = NewsFeed::new();

        feed.select_category(&source, Some(NewsCategory::Mars)).await.unwrap();
        feed.load_more(&source).await.unwrap().unwrap();
        let moon = feed
            .select_category(&source, Some(NewsCategory::Moon))
            .await
            .unwrap();

        assert_eq!(feed.articles(), moon.articles.as_slice());
        assert!(feed.articles().iter().all(|a| a.title.starts_with("Moon")));
    }

    #[tokio::test]
    async fn load_more_requests_following_page_with_same_filter() {
        let source = mars_source();
        let mut feed = NewsFeed::new();

        feed.select_category(&source, Some(NewsCategory::Mars)).await.unwrap();
        assert!(feed.can_load_more());
        feed.load_more(&source).await.unwrap().unwrap();

        let seen = source.seen.lock().unwrap().clone();
        assert_eq!(seen[1].page_number, 2);
        assert_eq!(seen[1].category, Some(NewsCategory::Mars));
        // Short second page: nothing more to load.
        assert!(feed.load_more(&source).await.is_none());
    }

    #[tokio::test]
    async fn failure_keeps_articles_and_allows_identical_retry() {
        let mut feed = NewsFeed::new();
        feed.select_category(&mars_source(), Some(NewsCategory::Mars))
            .await
            .unwrap();
        let held = feed.articles().to_vec();

        let broken = StubSource {
            failing: true,
            ..Default::default()
        };
        assert!(feed.load_more(&broken).await.unwrap().is_err());
        assert!(matches!(feed.status(), FeedStatus::Failed(_)));
        assert_eq!(feed.articles(), held.as_slice());

        let failed_query = feed.last_query().cloned().unwrap();
        let source = mars_source();
        feed.retry(&source).await.unwrap().unwrap();
        assert_eq!(source.seen.lock().unwrap()[0], failed_query);
        assert_eq!(feed.status(), &FeedStatus::Ready);
        assert_eq!(feed.articles().len(), PAGE_SIZE + 2);
    }

    #[tokio::test]
    async fn retry_is_unavailable_unless_failed() {
        let source = mars_source();
        let mut feed = NewsFeed::new();
        assert!(feed.retry(&source).await.is_none());
        feed.select_category(&source, None).await.unwrap();
        assert!(feed.retry(&source).await.is_none());
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let source = StubSource::default();
        let mut feed = NewsFeed::new();
        let page = feed.search(&source, Some("nothing".to_string())).await.unwrap();

        assert!(page.articles.is_empty());
        assert_eq!(feed.status(), &FeedStatus::Ready);
        assert!(!feed.can_load_more());
    }

    #[tokio::test]
    async fn search_keeps_category_and_category_keeps_search() {
        let source = mars_source();
        let mut feed = NewsFeed::new();

        feed.search(&source, Some("rover".to_string())).await.unwrap();
        feed.select_category(&source, Some(NewsCategory::Mars)).await.unwrap();
        assert_eq!(feed.search_text(), Some("rover"));
        assert_eq!(feed.category(), Some(NewsCategory::Mars));

        feed.select_category(&source, None).await.unwrap();
        let last = source.seen.lock().unwrap().last().cloned().unwrap();
        assert_eq!(last.search_term(), Some("rover"));
    }

    #[test]
    fn placeholders_only_while_first_page_loads() {
        let mut feed = NewsFeed::new();
        let request = feed.begin(NewsQuery::default());
        assert_eq!(feed.placeholder_slots(), PAGE_SIZE);
        feed.complete(&request, &Ok(NewsPage::from_results(articles("x", 0, PAGE_SIZE))));
        assert_eq!(feed.placeholder_slots(), 0);

        let next = feed.next_page_query().unwrap();
        feed.begin(next);
        assert_eq!(feed.status(), &FeedStatus::LoadingMore);
        assert_eq!(feed.placeholder_slots(), 0);
        assert_eq!(feed.articles().len(), PAGE_SIZE);
    }

    #[test]
    fn superseded_response_is_discarded() {
        let mut feed = NewsFeed::new();
        let mars = feed.begin(NewsQuery::first_page(Some(NewsCategory::Mars), None));
        feed.complete(&mars, &Ok(NewsPage::from_results(articles("Mars", 1, PAGE_SIZE))));

        // A slow "load more" is overtaken by a filter change.
        let more = feed.begin(feed.next_page_query().unwrap());
        let moon = feed.begin(NewsQuery::first_page(Some(NewsCategory::Moon), None));

        assert!(feed.complete(&moon, &Ok(NewsPage::from_results(articles("Moon", 200, 3)))));
        assert!(!feed.complete(&more, &Ok(NewsPage::from_results(articles("Mars", 100, 2)))));

        assert_eq!(feed.articles().len(), 3);
        assert!(feed.articles().iter().all(|a| a.title.starts_with("Moon")));
        assert_eq!(feed.category(), Some(NewsCategory::Moon));
    }

    #[test]
    fn stale_failure_does_not_overwrite_newer_success() {
        let mut feed = NewsFeed::new();
        let old = feed.begin(NewsQuery::first_page(Some(NewsCategory::Mars), None));
        let new = feed.begin(NewsQuery::first_page(Some(NewsCategory::Moon), None));

        feed.complete(&new, &Ok(NewsPage::from_results(articles("Moon", 1, 1))));
        let stale = Err(FetchError::Api {
            status: 502,
            message: String::new(),
        });
        assert!(!feed.complete(&old, &stale));
        assert_eq!(feed.status(), &FeedStatus::Ready);
    }
}
