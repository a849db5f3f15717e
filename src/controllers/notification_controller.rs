use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState,
    controllers::{JsonBody, loose_bool, loose_int, parse_id, require_user},
    error::AppError,
    models::{CurrentUser, Notification, NotificationKind},
    services::{
        dustbin_service,
        notification_service::{self, NotificationChanges},
    },
};

fn parse_kind(raw: &str) -> Result<NotificationKind, AppError> {
    NotificationKind::parse(raw.trim())
        .ok_or_else(|| AppError::invalid("INVALID_TYPE", "Type must be info, warning or alert"))
}

/// A bin reference from a body must point at one of the caller's bins.
async fn owned_dustbin(state: &AppState, user_id: &str, v: &Value) -> Result<i64, AppError> {
    let invalid = || AppError::invalid("INVALID_DUSTBIN", "Dustbin not found or not owned by user");

    let id = loose_int(v).filter(|id| *id > 0).ok_or_else(invalid)?;
    if !dustbin_service::owns_dustbin(state, user_id, id).await? {
        return Err(invalid());
    }
    Ok(id)
}

#[derive(Deserialize)]
pub struct NotificationQuery {
    pub is_read: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Query(q): Query<NotificationQuery>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let u = require_user(user)?;

    let is_read = match q.is_read.as_deref().map(str::trim) {
        Some("1") | Some("true") => Some(true),
        Some("0") | Some("false") => Some(false),
        _ => None,
    };

    notification_service::list_notifications(&state, &u.id, is_read)
        .await
        .map(Json)
}

#[derive(Deserialize)]
pub struct CreateNotificationBody {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub dustbin_id: Option<Value>,
}

pub async fn create(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    JsonBody(body): JsonBody<CreateNotificationBody>,
) -> Result<impl IntoResponse, AppError> {
    let u = require_user(user)?;

    let message = body
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::invalid("MISSING_MESSAGE", "Message is required"))?;

    let kind = body
        .kind
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| AppError::invalid("MISSING_TYPE", "Type is required"))?;
    let kind = parse_kind(&kind)?;

    let dustbin_id = match body.dustbin_id {
        Some(v) => Some(owned_dustbin(&state, &u.id, &v).await?),
        None => None,
    };

    let n = notification_service::create_notification(&state, &u.id, &message, kind, dustbin_id).await?;
    Ok((StatusCode::CREATED, Json(n)))
}

#[derive(Deserialize)]
pub struct UpdateNotificationBody {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "crate::controllers::present")]
    pub is_read: Option<Value>,
    #[serde(default, deserialize_with = "crate::controllers::present")]
    pub dustbin_id: Option<Value>,
}

pub async fn update(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateNotificationBody>,
) -> Result<Json<Notification>, AppError> {
    let u = require_user(user)?;
    let id = parse_id(&id)?;

    let mut changes = NotificationChanges::default();

    if let Some(message) = body.message {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::invalid("MISSING_MESSAGE", "Message cannot be empty"));
        }
        changes.message = Some(message.to_string());
    }

    if let Some(kind) = body.kind {
        changes.kind = Some(parse_kind(&kind)?);
    }

    if let Some(v) = body.is_read {
        changes.is_read = Some(loose_bool(&v).ok_or_else(|| {
            AppError::invalid("INVALID_IS_READ", "is_read must be true, false, 1 or 0")
        })?);
    }

    changes.dustbin_id = match body.dustbin_id {
        None => None,
        Some(Value::Null) => Some(None),
        Some(v) => Some(Some(owned_dustbin(&state, &u.id, &v).await?)),
    };

    notification_service::update_notification(&state, &u.id, id, changes)
        .await
        .map(Json)
}

// PUT /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<String>,
) -> Result<Json<Notification>, AppError> {
    let u = require_user(user)?;
    let id = parse_id(&id)?;
    notification_service::mark_read(&state, &u.id, id).await.map(Json)
}

pub async fn delete(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let u = require_user(user)?;
    let id = parse_id(&id)?;
    let n = notification_service::delete_notification(&state, &u.id, id).await?;

    Ok(Json(json!({
        "message": "Notification deleted successfully",
        "notification": n,
    })))
}
