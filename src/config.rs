use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub search: SearchConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub openai_api_key: String,
    pub default_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub google_books_api_key: Option<String>,
    pub max_results: usize,
}

/// Retry and sequencing defaults for the analysis pipeline.
///
/// `timeout_seconds` is a recorded budget, not a hard abort; see the
/// orchestration module.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub max_retries: u32,
    pub timeout_seconds: u64,
    pub enable_parallel: bool,
    pub enable_evaluation: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
            llm: LLMConfig {
                openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                default_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            },
            search: SearchConfig {
                google_books_api_key: env::var("GOOGLE_API_KEY").ok(),
                max_results: env::var("SEARCH_MAX_RESULTS")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()?,
            },
            pipeline: PipelineConfig {
                max_retries: env::var("PIPELINE_MAX_RETRIES")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()?,
                timeout_seconds: env::var("PIPELINE_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()?,
                enable_parallel: env::var("ENABLE_PARALLEL")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()?,
                enable_evaluation: env::var("ENABLE_EVALUATION")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()?,
            },
        })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout_seconds: 300,
            enable_parallel: true,
            enable_evaluation: true,
        }
    }
}
