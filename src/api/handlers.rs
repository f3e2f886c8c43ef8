use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{RefineRequest, ReferenceItem, ResultsResponse, SearchRequest},
};

use super::AppState;

const SEARCH_FAILED: &str = "Error generating results";
const REFINE_FAILED: &str = "Error refining results";

/// Undecodable bodies get the same JSON error shape as every other failure
fn malformed_body(rejection: JsonRejection) -> AppError {
    tracing::warn!(error = %rejection.body_text(), "Rejected request body");
    AppError::InvalidInput(rejection.body_text())
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Service banner
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Hopscotch API" }))
}

/// Generate three visual recommendations for a query
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> AppResult<Json<ResultsResponse>> {
    let Json(request) = payload.map_err(|e| malformed_body(e).context(SEARCH_FAILED))?;

    tracing::info!(
        request_id = %request_id,
        query = %request.query,
        feedback_entries = request.feedback_history.len(),
        "Processing search request"
    );

    if request.query.trim().is_empty() {
        return Err(AppError::InvalidInput("query cannot be empty".to_string()).context(SEARCH_FAILED));
    }

    let results = state
        .recommendations
        .search(request.query, request.feedback_history)
        .await
        .map_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "Search failed");
            e.context(SEARCH_FAILED)
        })?;

    tracing::info!(
        request_id = %request_id,
        results = results.len(),
        "Search completed"
    );

    Ok(Json(ResultsResponse { results }))
}

/// Replace cards in the current set based on similar/different feedback
pub async fn refine(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RefineRequest>, JsonRejection>,
) -> AppResult<Json<ResultsResponse>> {
    let Json(request) = payload.map_err(|e| malformed_body(e).context(REFINE_FAILED))?;

    tracing::info!(
        request_id = %request_id,
        feedback = %request.feedback,
        clicked = %request.clicked_result.title,
        result_index = request.result_index,
        "Processing refine request"
    );

    let reference = ReferenceItem::new(
        request.clicked_result,
        request.all_results,
        request.result_index,
    )
    .map_err(|e| e.context(REFINE_FAILED))?;

    let results = state
        .recommendations
        .refine(request.feedback, reference)
        .await
        .map_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "Refine failed");
            e.context(REFINE_FAILED)
        })?;

    tracing::info!(
        request_id = %request_id,
        results = results.len(),
        "Refine completed"
    );

    Ok(Json(ResultsResponse { results }))
}
