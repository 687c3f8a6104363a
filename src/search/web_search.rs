//! Web search delegated to an OpenAI chat model.
//!
//! The model is treated as an opaque capability: given a research query it
//! returns free text with whatever sources it can cite. Calls go through the
//! retry executor like every other external API.

use crate::config::LLMConfig;
use crate::types::{AppError, AppResult};
use crate::utils::{with_retry, ClassifyFailure, FailureKind, RetryPolicy};
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Single result from a web search pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub display_link: Option<String>,
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct WebSearchError(#[from] OpenAIError);

impl ClassifyFailure for WebSearchError {
    fn kind(&self) -> FailureKind {
        match &self.0 {
            OpenAIError::Reqwest(e) => {
                if e.is_timeout() {
                    FailureKind::Timeout
                } else {
                    FailureKind::Connection
                }
            }
            OpenAIError::ApiError(api) => {
                let message = api.message.to_lowercase();
                if message.contains("rate limit") {
                    FailureKind::RateLimited
                } else if message.contains("api key") || message.contains("authentication") {
                    FailureKind::Auth
                } else {
                    FailureKind::Http
                }
            }
            OpenAIError::JSONDeserialize(..) => FailureKind::Parse,
            _ => FailureKind::Other,
        }
    }
}

/// OpenAI-backed web search client.
pub struct WebSearchClient {
    client: Client<OpenAIConfig>,
    model: String,
    retry: RetryPolicy,
}

impl WebSearchClient {
    /// Returns `None` when no API key is configured; callers treat that as a
    /// setup failure.
    pub fn new(config: &LLMConfig, retry: RetryPolicy) -> Option<Self> {
        if config.openai_api_key.is_empty() {
            return None;
        }
        let openai_config = OpenAIConfig::new().with_api_key(&config.openai_api_key);
        Some(Self {
            client: Client::with_config(openai_config),
            model: config.default_model.clone(),
            retry,
        })
    }

    pub async fn search_author_biography(&self, author_name: &str) -> AppResult<Vec<SearchResult>> {
        let query = format!(
            "Find biographical information about author \"{author_name}\" including birth date, \
             death date, nationality, literary movements, key influences, and major life events"
        );
        self.search_with_context(&query, "biography").await
    }

    pub async fn search_author_criticism(&self, author_name: &str) -> AppResult<Vec<SearchResult>> {
        let query = format!(
            "Find literary criticism, scholarly analysis, and academic papers about author \
             \"{author_name}\" and their themes, style, and literary contributions"
        );
        self.search_with_context(&query, "criticism").await
    }

    pub async fn search_author_influences(&self, author_name: &str) -> AppResult<Vec<SearchResult>> {
        let query = format!(
            "Find information about \"{author_name}\" literary influences, who influenced them, \
             and who they influenced in literature"
        );
        self.search_with_context(&query, "influences").await
    }

    pub async fn search_similar_authors(&self, author_name: &str) -> AppResult<Vec<SearchResult>> {
        let query = format!(
            "Find authors similar to \"{author_name}\" with comparable writing styles, themes, \
             or literary movements, and for each one briefly say why"
        );
        self.search_with_context(&query, "similar_authors").await
    }

    pub async fn search(&self, query: &str) -> AppResult<Vec<SearchResult>> {
        self.search_with_context(query, "general").await
    }

    async fn search_with_context(&self, query: &str, context: &str) -> AppResult<Vec<SearchResult>> {
        debug!(context, "running web search");

        let content = with_retry(&self.retry, || self.complete(query))
            .await
            .map_err(|e| AppError::LLMApi(e.to_string()))?;

        let results = vec![SearchResult {
            title: format!("Web Search - {context}"),
            link: "https://openai.com/search".to_string(),
            snippet: content,
            display_link: Some("OpenAI Web Search".to_string()),
        }];
        info!(context, count = results.len(), "web search complete");
        Ok(results)
    }

    async fn complete(&self, query: &str) -> Result<String, WebSearchError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(
                        "You are a literary research assistant. Search your knowledge and \
                         provide relevant, factual information with sources where possible.",
                    )
                    .build()
                    .map_err(WebSearchError::from)?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(format!(
                        "{query}. Please provide findings with titles, sources, and brief descriptions."
                    ))
                    .build()
                    .map_err(WebSearchError::from)?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(WebSearchError::from)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(WebSearchError::from)?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content)
    }
}
