// Shared error types

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Search API error: {0}")]
    SearchApi(String),

    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Pipeline setup error: {0}")]
    Setup(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
