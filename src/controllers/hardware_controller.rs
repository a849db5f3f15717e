use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
};
use serde_json::{Value, json};

use crate::{
    AppState,
    error::AppError,
    models::timestamp_now,
    services::ingest_service::{self, DEVICE_KEY_HEADER, FillReport},
};

// POST /api/hardware/dustbin-update
//
// The key is checked before the body is even parsed: a wrong key gets 401
// no matter what was sent.
pub async fn post_dustbin_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let presented = headers.get(DEVICE_KEY_HEADER).and_then(|v| v.to_str().ok());
    if let Err(e) = ingest_service::verify_device_key(&state.settings, presented) {
        tracing::warn!(has_key = presented.is_some(), "device report rejected: bad api key");
        return Err(e);
    }

    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::invalid("INVALID_JSON", format!("Invalid JSON body: {e}")))?;

    let report = FillReport::from_json(&value)?;
    let outcome = ingest_service::apply_fill_report(&state, report).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Dustbin updated successfully",
        "data": outcome.update,
    })))
}

// GET /api/hardware/dustbin-update
pub async fn get_dustbin_update_health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "endpoint": "hardware-dustbin-update",
        "timestamp": timestamp_now(),
    }))
}
