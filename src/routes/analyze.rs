use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::models::{AnalyzeRequest, AnalyzeResponse, AppState};
use crate::orchestration::{ExecutionPolicy, LiteraryPipeline};
use crate::utils::guardrails;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/api/analyze/{author_name}", get(analyze_by_path))
        .with_state(state)
}

async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> (StatusCode, ResponseJson<AnalyzeResponse>) {
    let policy = match request.execution_policy.as_deref() {
        None => default_policy(&state),
        Some(raw) => match ExecutionPolicy::parse(raw) {
            Some(policy) => policy,
            None => {
                return failure(
                    StatusCode::BAD_REQUEST,
                    &request.author_name,
                    format!("Unknown execution policy: {raw}"),
                )
            }
        },
    };
    run_analysis(&state, &request.author_name, policy).await
}

async fn analyze_by_path(
    State(state): State<AppState>,
    Path(author_name): Path<String>,
) -> (StatusCode, ResponseJson<AnalyzeResponse>) {
    let policy = default_policy(&state);
    run_analysis(&state, &author_name, policy).await
}

fn default_policy(state: &AppState) -> ExecutionPolicy {
    if state.config.pipeline.enable_parallel {
        ExecutionPolicy::Independent
    } else {
        ExecutionPolicy::Chained
    }
}

async fn run_analysis(
    state: &AppState,
    author_name: &str,
    policy: ExecutionPolicy,
) -> (StatusCode, ResponseJson<AnalyzeResponse>) {
    let author_name = match guardrails::validate_author_name(author_name) {
        Ok(name) => name,
        Err(reason) => {
            return failure(StatusCode::BAD_REQUEST, author_name, reason);
        }
    };

    let pipeline = match LiteraryPipeline::new(&state.config, state.http.clone()) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!(error = %e, "pipeline setup failed");
            return failure(
                StatusCode::SERVICE_UNAVAILABLE,
                &author_name,
                e.to_string(),
            );
        }
    };

    let request_id = Uuid::new_v4();
    info!(%request_id, author = %author_name, ?policy, "handling analysis request");

    let result = pipeline.run(&author_name, policy).await;
    let elapsed_seconds = match (result.state.started_at, result.state.completed_at) {
        (Some(start), Some(end)) => (end - start).num_milliseconds().max(0) as f64 / 1000.0,
        _ => 0.0,
    };

    let response = AnalyzeResponse {
        success: result.success,
        author_name,
        report: result.report,
        elapsed_seconds,
        errors: result.errors,
    };
    (StatusCode::OK, Json(response))
}

fn failure(
    status: StatusCode,
    author_name: &str,
    message: String,
) -> (StatusCode, ResponseJson<AnalyzeResponse>) {
    (
        status,
        Json(AnalyzeResponse {
            success: false,
            author_name: author_name.to_string(),
            report: None,
            elapsed_seconds: 0.0,
            errors: vec![message],
        }),
    )
}
