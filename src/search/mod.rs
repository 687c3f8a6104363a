//! External search APIs
//!
//! - Google Books: bibliography metadata for an author's published works
//! - Web search: biography, criticism, and influence research via an OpenAI
//!   chat model

pub mod google_books;
pub mod web_search;

pub use google_books::{BookInfo, BooksError, GoogleBooksClient};
pub use web_search::{SearchResult, WebSearchClient};
