//! API Routes
//!
//! HTTP endpoints for the application:
//! - `/api/analyze` - Author analysis (POST with options, GET by name)
//! - `/api/health` - Health checks
//! - `/` - Service information

pub mod analyze;
pub mod health;

use axum::{response::Json as ResponseJson, routing::get, Json, Router};
use tracing::info;

use crate::middleware::cors::apply_cors;
use crate::models::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let router = Router::new()
        .merge(analyze::router(state.clone()))
        .merge(health::router(state))
        .route("/", get(service_info));

    apply_cors(router)
}

async fn service_info() -> ResponseJson<serde_json::Value> {
    Json(serde_json::json!({
        "service": "The Literary Finder",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "analyze": "POST /api/analyze",
            "analyze_by_name": "GET /api/analyze/{author_name}",
            "health": "GET /api/health"
        }
    }))
}
