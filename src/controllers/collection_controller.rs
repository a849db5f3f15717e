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
    controllers::{JsonBody, loose_int, non_empty, nullable_text, parse_id, require_user},
    error::AppError,
    models::{Collection, CollectionStatus, CurrentUser},
    services::{
        collection_service::{self, CollectionChanges, CollectionFilter},
        dustbin_service,
    },
};

fn parse_status(raw: &str) -> Result<CollectionStatus, AppError> {
    CollectionStatus::parse(raw.trim()).ok_or_else(|| {
        AppError::invalid(
            "INVALID_STATUS",
            "Status must be scheduled, in_progress, completed or cancelled",
        )
    })
}

#[derive(Deserialize)]
pub struct CollectionQuery {
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Query(q): Query<CollectionQuery>,
) -> Result<Json<Vec<Collection>>, AppError> {
    let u = require_user(user)?;

    let status = match non_empty(q.status) {
        Some(s) => Some(parse_status(&s)?),
        None => None,
    };

    let filter = CollectionFilter {
        status,
        date_from: non_empty(q.date_from),
        date_to: non_empty(q.date_to),
    };

    collection_service::list_collections(&state, &u.id, &filter)
        .await
        .map(Json)
}

#[derive(Deserialize)]
pub struct ScheduleBody {
    pub dustbin_id: Option<Value>,
    pub scheduled_date: Option<String>,
    pub notes: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    JsonBody(body): JsonBody<ScheduleBody>,
) -> Result<impl IntoResponse, AppError> {
    let u = require_user(user)?;

    let dustbin_id = body
        .dustbin_id
        .as_ref()
        .and_then(loose_int)
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::invalid("MISSING_DUSTBIN_ID", "dustbin_id is required"))?;

    let scheduled_date = non_empty(body.scheduled_date)
        .ok_or_else(|| AppError::invalid("MISSING_SCHEDULED_DATE", "scheduled_date is required"))?;

    if !dustbin_service::owns_dustbin(&state, &u.id, dustbin_id).await? {
        return Err(AppError::not_found("DUSTBIN_NOT_FOUND", "Dustbin not found"));
    }

    let notes = non_empty(body.notes);
    let c = collection_service::schedule_collection(
        &state,
        &u.id,
        dustbin_id,
        &scheduled_date,
        notes.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(c)))
}

pub async fn get_one(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<String>,
) -> Result<Json<Collection>, AppError> {
    let u = require_user(user)?;
    let id = parse_id(&id)?;
    collection_service::get_collection(&state, &u.id, id).await.map(Json)
}

#[derive(Deserialize)]
pub struct UpdateCollectionBody {
    pub status: Option<String>,
    #[serde(default, deserialize_with = "crate::controllers::present")]
    pub completed_date: Option<Value>,
    #[serde(default, deserialize_with = "crate::controllers::present")]
    pub notes: Option<Value>,
    pub scheduled_date: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateCollectionBody>,
) -> Result<Json<Collection>, AppError> {
    let u = require_user(user)?;
    let id = parse_id(&id)?;

    let status = match body.status {
        Some(s) => Some(parse_status(&s)?),
        None => None,
    };

    let scheduled_date = match body.scheduled_date {
        Some(d) => Some(non_empty(Some(d)).ok_or_else(|| {
            AppError::invalid("MISSING_SCHEDULED_DATE", "scheduled_date cannot be empty")
        })?),
        None => None,
    };

    let changes = CollectionChanges {
        status,
        completed_date: nullable_text(body.completed_date),
        notes: nullable_text(body.notes),
        scheduled_date,
    };

    collection_service::update_collection(&state, &u.id, id, changes)
        .await
        .map(Json)
}

pub async fn delete(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let u = require_user(user)?;
    let id = parse_id(&id)?;
    let c = collection_service::cancel_collection(&state, &u.id, id).await?;

    Ok(Json(json!({
        "message": "Collection cancelled successfully",
        "collection": c,
    })))
}
