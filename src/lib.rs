// The Literary Finder - Multi-agent author research and reading map service

pub mod agents;
pub mod config;
pub mod evaluation;
pub mod middleware;
pub mod models;
pub mod orchestration;
pub mod routes;
pub mod search;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
pub use orchestration::{ExecutionPolicy, LiteraryPipeline};

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
