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
    controllers::{JsonBody, loose_bool, loose_int, nullable_text, parse_id, require_user},
    error::AppError,
    models::{BinKind, CurrentUser, Dustbin, FillStatus},
    services::dustbin_service::{self, DustbinChanges, DustbinFilter, NewDustbin},
};

/// Trimmed non-empty text; coordinates may arrive as JSON numbers.
fn text_field(v: Option<Value>) -> Option<String> {
    match v? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required(v: Option<Value>, code: &'static str, message: &str) -> Result<String, AppError> {
    text_field(v).ok_or_else(|| AppError::invalid(code, message))
}

/// `Ok(None)` when absent, an error when present but blank.
fn changed(v: Option<Value>, code: &'static str, message: &str) -> Result<Option<String>, AppError> {
    match v {
        None => Ok(None),
        some => required(some, code, message).map(Some),
    }
}

fn fill_level(v: &Value) -> Result<i64, AppError> {
    loose_int(v).filter(|l| (0..=100).contains(l)).ok_or_else(|| {
        AppError::invalid("INVALID_FILL_LEVEL", "Fill level must be a number between 0 and 100")
    })
}

// ---------------- List ----------------

#[derive(Deserialize, Default)]
pub struct DustbinQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub is_active: Option<String>,
    pub search: Option<String>,
}

impl DustbinQuery {
    pub fn into_filter(self) -> Result<DustbinFilter, AppError> {
        let status = match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(FillStatus::parse(s).ok_or_else(|| {
                AppError::invalid("INVALID_STATUS", "Status must be empty, half, three-quarter or full")
            })?),
            None => None,
        };

        let kind = match self.kind.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(k) => Some(
                BinKind::parse(k)
                    .ok_or_else(|| AppError::invalid("INVALID_TYPE", "Type must be wet or dry"))?,
            ),
            None => None,
        };

        let is_active = match self.is_active.as_deref().map(str::trim) {
            Some("1") | Some("true") => Some(true),
            Some("0") | Some("false") => Some(false),
            _ => None,
        };

        Ok(DustbinFilter {
            limit: self.limit.and_then(|l| l.trim().parse().ok()),
            offset: self.offset.and_then(|o| o.trim().parse().ok()),
            status,
            kind,
            is_active,
            search: self.search.map(|s| s.trim().to_string()),
        })
    }
}

pub async fn list(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Query(q): Query<DustbinQuery>,
) -> Result<Json<Vec<Dustbin>>, AppError> {
    let u = require_user(user)?;
    let filter = q.into_filter()?;
    dustbin_service::list_dustbins(&state, &u.id, &filter).await.map(Json)
}

// ---------------- Create ----------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDustbinBody {
    pub name: Option<Value>,
    #[serde(rename = "type")]
    pub kind: Option<Value>,
    pub location_name: Option<Value>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
}

pub fn validate_new(body: CreateDustbinBody) -> Result<NewDustbin, AppError> {
    let name = required(body.name, "MISSING_NAME", "Name is required")?;

    let kind = text_field(body.kind)
        .and_then(|k| BinKind::parse(&k))
        .ok_or_else(|| AppError::invalid("INVALID_TYPE", "Type must be wet or dry"))?;

    let location_name = required(body.location_name, "MISSING_LOCATION_NAME", "Location name is required")?;
    let latitude = required(body.latitude, "MISSING_LATITUDE", "Latitude is required")?;
    let longitude = required(body.longitude, "MISSING_LONGITUDE", "Longitude is required")?;

    Ok(NewDustbin {
        name,
        kind,
        location_name,
        latitude,
        longitude,
    })
}

pub async fn create(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    JsonBody(body): JsonBody<CreateDustbinBody>,
) -> Result<impl IntoResponse, AppError> {
    let u = require_user(user)?;
    let new = validate_new(body)?;
    let bin = dustbin_service::create_dustbin(&state, &u.id, new).await?;
    Ok((StatusCode::CREATED, Json(bin)))
}

// ---------------- Read / Update / Delete ----------------

pub async fn get_one(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<String>,
) -> Result<Json<Dustbin>, AppError> {
    let u = require_user(user)?;
    let id = parse_id(&id)?;
    dustbin_service::get_dustbin(&state, &u.id, id).await.map(Json)
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDustbinBody {
    #[serde(default, deserialize_with = "crate::controllers::present")]
    pub fill_level: Option<Value>,
    pub name: Option<Value>,
    pub location_name: Option<Value>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    #[serde(default, deserialize_with = "crate::controllers::present")]
    pub last_collection_date: Option<Value>,
    #[serde(default, deserialize_with = "crate::controllers::present")]
    pub next_collection_date: Option<Value>,
    #[serde(default, deserialize_with = "crate::controllers::present")]
    pub is_active: Option<Value>,
    #[serde(default, deserialize_with = "crate::controllers::present")]
    pub status: Option<Value>,
}

pub fn validate_changes(body: UpdateDustbinBody) -> Result<DustbinChanges, AppError> {
    if body.status.is_some() {
        return Err(AppError::invalid(
            "STATUS_IS_DERIVED",
            "Status is derived from fillLevel and cannot be set directly",
        ));
    }

    let fill_level = body.fill_level.as_ref().map(fill_level).transpose()?;

    let is_active = match body.is_active {
        None => None,
        Some(v) => Some(loose_bool(&v).ok_or_else(|| {
            AppError::invalid("INVALID_IS_ACTIVE", "isActive must be true, false, 1 or 0")
        })?),
    };

    Ok(DustbinChanges {
        fill_level,
        name: changed(body.name, "MISSING_NAME", "Name cannot be empty")?,
        location_name: changed(body.location_name, "MISSING_LOCATION_NAME", "Location name cannot be empty")?,
        latitude: changed(body.latitude, "MISSING_LATITUDE", "Latitude cannot be empty")?,
        longitude: changed(body.longitude, "MISSING_LONGITUDE", "Longitude cannot be empty")?,
        last_collection_date: nullable_text(body.last_collection_date),
        next_collection_date: nullable_text(body.next_collection_date),
        is_active,
    })
}

pub async fn update(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateDustbinBody>,
) -> Result<Json<Dustbin>, AppError> {
    let u = require_user(user)?;
    let id = parse_id(&id)?;
    let changes = validate_changes(body)?;
    dustbin_service::update_dustbin(&state, &u.id, id, changes).await.map(Json)
}

pub async fn delete(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let u = require_user(user)?;
    let id = parse_id(&id)?;
    let bin = dustbin_service::deactivate_dustbin(&state, &u.id, id).await?;

    Ok(Json(json!({
        "message": "Dustbin deactivated successfully",
        "dustbin": bin,
    })))
}
