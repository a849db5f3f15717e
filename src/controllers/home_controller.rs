use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, error::AppError, services::db_init};

pub async fn not_found() -> Response {
    AppError::not_found("NOT_FOUND", "Route not found").into_response()
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn health_db(State(state): State<AppState>) -> Response {
    match db_init::ping(&state.db).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "database": "ok" }))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "database ping failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "database": "error", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
