//! Google Books API client.
//!
//! Volume search for an author's published works. Requests go through the
//! retry executor; transient transport failures are retried, anything else
//! fails fast.

use crate::config::SearchConfig;
use crate::utils::{with_retry, ClassifyFailure, FailureKind, RetryError, RetryPolicy};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const GOOGLE_BOOKS_URL: &str = "https://www.googleapis.com/books/v1/volumes";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors from the Google Books API, classified for the retry executor.
#[derive(Debug, Error)]
pub enum BooksError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("rate limited by Google Books API")]
    RateLimited,

    #[error("authentication rejected (status {0})")]
    Auth(u16),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl ClassifyFailure for BooksError {
    fn kind(&self) -> FailureKind {
        match self {
            BooksError::Timeout => FailureKind::Timeout,
            BooksError::Connection(_) => FailureKind::Connection,
            BooksError::RateLimited => FailureKind::RateLimited,
            BooksError::Auth(_) => FailureKind::Auth,
            BooksError::Status(_) => FailureKind::Http,
            BooksError::Parse(_) => FailureKind::Parse,
        }
    }
}

impl From<reqwest::Error> for BooksError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BooksError::Timeout
        } else if e.is_connect() {
            BooksError::Connection(e.to_string())
        } else if let Some(status) = e.status() {
            match status.as_u16() {
                429 => BooksError::RateLimited,
                401 | 403 => BooksError::Auth(status.as_u16()),
                code => BooksError::Status(code),
            }
        } else if e.is_decode() {
            BooksError::Parse(e.to_string())
        } else {
            BooksError::Connection(e.to_string())
        }
    }
}

/// Book information from the Google Books API.
#[derive(Debug, Clone)]
pub struct BookInfo {
    pub title: String,
    pub authors: Vec<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub isbn_10: Option<String>,
    pub isbn_13: Option<String>,
    pub categories: Vec<String>,
    pub google_books_link: Option<String>,
    pub preview_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
    #[serde(rename = "accessInfo")]
    access_info: Option<AccessInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    published_date: Option<String>,
    description: Option<String>,
    #[serde(default)]
    industry_identifiers: Vec<IndustryIdentifier>,
    #[serde(default)]
    categories: Vec<String>,
    info_link: Option<String>,
    preview_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessInfo {
    web_reader_link: Option<String>,
}

/// Google Books API client.
pub struct GoogleBooksClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    max_results: usize,
    retry: RetryPolicy,
}

impl GoogleBooksClient {
    pub fn new(http: reqwest::Client, config: &SearchConfig, retry: RetryPolicy) -> Self {
        Self {
            http,
            api_key: config.google_books_api_key.clone(),
            base_url: GOOGLE_BOOKS_URL.to_string(),
            max_results: config.max_results,
            retry,
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search for books written by `author_name`, retrying transient
    /// transport failures per the configured policy.
    pub async fn search_books_by_author(
        &self,
        author_name: &str,
    ) -> Result<Vec<BookInfo>, RetryError<BooksError>> {
        let books = with_retry(&self.retry, || self.fetch_volumes(author_name)).await?;
        info!(count = books.len(), author = author_name, "Google Books search complete");
        Ok(books)
    }

    async fn fetch_volumes(&self, author_name: &str) -> Result<Vec<BookInfo>, BooksError> {
        let mut params: Vec<(&str, String)> = vec![
            ("q", format!("inauthor:{author_name}")),
            ("maxResults", self.max_results.to_string()),
            ("orderBy", "relevance".to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }

        debug!(author = author_name, "querying Google Books volumes");
        let response = self
            .http
            .get(&self.base_url)
            .query(&params)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let data: VolumesResponse = response
            .json()
            .await
            .map_err(|e| BooksError::Parse(e.to_string()))?;

        let author_lower = author_name.to_lowercase();
        let books = data
            .items
            .into_iter()
            .filter_map(|v| parse_book(v.volume_info, v.access_info))
            .filter(|b| b.authors.join(" ").to_lowercase().contains(&author_lower))
            .collect();

        Ok(books)
    }
}

/// Parse one volume; entries without a title or authors are dropped.
fn parse_book(volume_info: VolumeInfo, access_info: Option<AccessInfo>) -> Option<BookInfo> {
    let title = volume_info.title?;
    if volume_info.authors.is_empty() {
        return None;
    }

    let mut isbn_10 = None;
    let mut isbn_13 = None;
    for id in &volume_info.industry_identifiers {
        match id.kind.as_str() {
            "ISBN_10" => isbn_10 = Some(id.identifier.clone()),
            "ISBN_13" => isbn_13 = Some(id.identifier.clone()),
            _ => {}
        }
    }

    // The web reader link is a better preview target when present.
    let preview_link = access_info
        .and_then(|a| a.web_reader_link)
        .or(volume_info.preview_link);

    Some(BookInfo {
        title,
        authors: volume_info.authors,
        published_date: volume_info.published_date,
        description: volume_info.description,
        isbn_10,
        isbn_13,
        categories: volume_info.categories,
        google_books_link: volume_info.info_link,
        preview_link,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::RetryPolicy;

    fn sample_volume_json() -> serde_json::Value {
        serde_json::json!({
            "items": [
                {
                    "volumeInfo": {
                        "title": "Invisible Cities",
                        "authors": ["Italo Calvino"],
                        "publishedDate": "1972",
                        "description": "Marco Polo describes fantastical cities to Kublai Khan.",
                        "industryIdentifiers": [
                            {"type": "ISBN_13", "identifier": "9780156453806"},
                            {"type": "ISBN_10", "identifier": "0156453800"}
                        ],
                        "categories": ["Fiction"],
                        "infoLink": "https://books.google.com/books?id=1",
                        "previewLink": "https://books.google.com/books?id=1&printsec=frontcover"
                    },
                    "accessInfo": {
                        "webReaderLink": "https://play.google.com/books/reader?id=1"
                    }
                },
                {
                    "volumeInfo": {
                        "title": "Anthology Without Authors"
                    }
                },
                {
                    "volumeInfo": {
                        "title": "Unrelated Book",
                        "authors": ["Somebody Else"]
                    }
                }
            ]
        })
    }

    fn test_client(base_url: String) -> GoogleBooksClient {
        let config = SearchConfig {
            google_books_api_key: None,
            max_results: 20,
        };
        let retry = RetryPolicy::new(2)
            .base_delay(Duration::from_millis(1))
            .max_delay(Duration::from_millis(2))
            .jitter(false)
            .retry_on(vec![FailureKind::Timeout, FailureKind::Connection, FailureKind::RateLimited]);
        GoogleBooksClient::new(reqwest::Client::new(), &config, retry).with_base_url(base_url)
    }

    #[tokio::test]
    async fn searches_and_filters_by_author() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(sample_volume_json().to_string())
            .create_async()
            .await;

        let client = test_client(server.url());
        let books = client.search_books_by_author("Italo Calvino").await.unwrap();

        mock.assert_async().await;
        // The authorless volume and the unrelated author are filtered out.
        assert_eq!(books.len(), 1);
        let book = &books[0];
        assert_eq!(book.title, "Invisible Cities");
        assert_eq!(book.isbn_13.as_deref(), Some("9780156453806"));
        assert_eq!(book.isbn_10.as_deref(), Some("0156453800"));
        // Web reader link wins over the plain preview link.
        assert_eq!(book.preview_link.as_deref(), Some("https://play.google.com/books/reader?id=1"));
    }

    #[tokio::test]
    async fn non_retryable_status_fails_after_one_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_status(400)
            .expect(1)
            .create_async()
            .await;

        let client = test_client(server.url());
        let result = client.search_books_by_author("Italo Calvino").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RetryError::Aborted(BooksError::Status(400)))));
    }

    #[tokio::test]
    async fn rate_limit_is_retried_until_exhaustion() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .expect(3) // initial attempt + 2 retries
            .create_async()
            .await;

        let client = test_client(server.url());
        let result = client.search_books_by_author("Italo Calvino").await;

        mock.assert_async().await;
        match result {
            Err(RetryError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(last, BooksError::RateLimited));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[test]
    fn parse_book_requires_title_and_authors() {
        assert!(parse_book(VolumeInfo::default(), None).is_none());
        let info = VolumeInfo {
            title: Some("Orphan".to_string()),
            ..Default::default()
        };
        assert!(parse_book(info, None).is_none());
    }
}
