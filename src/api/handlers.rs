use axum::{
    extract::{rejection::JsonRejection, Path, RawQuery, State},
    http::StatusCode,
    response::Html,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::ComparisonResult,
};

use super::params::{usernames_from_path, CompareBody, CompareQuery};
use super::render;
use super::AppState;

/// Hint for visitors hitting the root without usernames
pub async fn index() -> &'static str {
    "Did you forget to add path parameters? Like <url>/compare/User1/User2?"
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// `GET /compare/{user1}/{user2}/...?status=..&exclude=..`
pub async fn compare_path(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(users): Path<String>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<ComparisonResult>> {
    let request = CompareQuery::parse(query.as_deref()).into_request(usernames_from_path(&users))?;

    tracing::info!(
        request_id = %request_id,
        users = ?request.usernames,
        status = %request.status,
        "Processing comparison request"
    );

    let result = state.comparison.compare(&request).await?;

    tracing::info!(request_id = %request_id, rows = result.len(), "Comparison served");

    Ok(Json(result))
}

/// `POST /compare` with `{"users": [...], "status": "..."}`
pub async fn compare_body(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<CompareBody>, JsonRejection>,
) -> AppResult<Json<ComparisonResult>> {
    let Json(body) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    let request = body.into_request()?;

    tracing::info!(
        request_id = %request_id,
        users = ?request.usernames,
        status = %request.status,
        "Processing comparison request"
    );

    let result = state.comparison.compare(&request).await?;

    tracing::info!(request_id = %request_id, rows = result.len(), "Comparison served");

    Ok(Json(result))
}

/// `GET /view/{user1}/{user2}/...` rendered as an HTML table
pub async fn compare_view(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(users): Path<String>,
    RawQuery(query): RawQuery,
) -> AppResult<Html<String>> {
    let request = CompareQuery::parse(query.as_deref()).into_request(usernames_from_path(&users))?;

    tracing::info!(
        request_id = %request_id,
        users = ?request.usernames,
        status = %request.status,
        "Rendering comparison page"
    );

    let entries = state.comparison.compare_entries(&request).await?;

    Ok(Html(render::comparison_page(&request, &entries)))
}
