//! Literary Cartographer agent.
//!
//! Compiles an author's bibliography from the Google Books API and organizes
//! it into a reading map with chronological, starting-point, and thematic
//! views.

use crate::agents::{AgentContext, ResearchAgent};
use crate::models::{AgentData, AgentRole, ReadingMap, ReadingMapEntry};
use crate::search::{BookInfo, GoogleBooksClient};
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

const DESCRIPTION_MAX_CHARS: usize = 200;

pub struct LiteraryCartographer {
    books: Arc<GoogleBooksClient>,
}

impl LiteraryCartographer {
    pub fn new(books: Arc<GoogleBooksClient>) -> Self {
        Self { books }
    }
}

#[async_trait]
impl ResearchAgent for LiteraryCartographer {
    fn role(&self) -> AgentRole {
        AgentRole::Cartographer
    }

    async fn process(
        &self,
        author_name: &str,
        _context: Option<&AgentContext>,
    ) -> AppResult<AgentData> {
        info!(author = author_name, "compiling bibliography");

        let books = self
            .books
            .search_books_by_author(author_name)
            .await
            .map_err(|e| AppError::SearchApi(e.to_string()))?;

        let entries: Vec<ReadingMapEntry> = books.into_iter().map(book_to_entry).collect();
        let map = ReadingMap::from_complete_works(entries);

        info!(
            author = author_name,
            works = map.complete_works.len(),
            dated = map.chronological.len(),
            "reading map assembled"
        );
        Ok(AgentData::ReadingMap(map))
    }
}

fn book_to_entry(book: BookInfo) -> ReadingMapEntry {
    ReadingMapEntry {
        title: book.title,
        year: book.published_date.as_deref().and_then(extract_year),
        description: book.description.map(|d| truncate_chars(&d, DESCRIPTION_MAX_CHARS)),
        isbn: book.isbn_13.or(book.isbn_10),
        category: book.categories.into_iter().next(),
        google_books_link: book.google_books_link,
        preview_link: book.preview_link,
    }
}

/// Pull the year out of a Google Books `publishedDate`, which may be a bare
/// year, `YYYY-MM`, or `YYYY-MM-DD`.
fn extract_year(date: &str) -> Option<i32> {
    let digits: String = date
        .split('-')
        .next()?
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if digits.len() == 4 {
        digits.parse().ok()
    } else {
        None
    }
}

/// Truncate at a char boundary, appending an ellipsis when shortened.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(max_chars).collect();
        truncated.push_str("...");
        truncated
    }
}
