use std::sync::LazyLock;

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use regex::Regex;
use serde::Deserialize;

use crate::{
    AppState,
    controllers::{JsonBody, non_empty, require_user},
    error::AppError,
    models::{CurrentUser, OrgCategory, UserProfile},
    services::user_service,
};

static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s-]{10,15}$").expect("mobile regex"));

pub async fn me(user: Option<Extension<CurrentUser>>) -> Result<Json<CurrentUser>, AppError> {
    require_user(user).map(Json)
}

// ---------------- Profile ----------------

#[derive(Deserialize)]
pub struct ProfileBody {
    pub organization_name: Option<String>,
    pub category: Option<String>,
    pub mobile_number: Option<String>,
}

#[derive(Debug)]
pub struct ValidProfile {
    pub organization_name: String,
    pub category: OrgCategory,
    pub mobile_number: String,
}

pub fn validate_profile(body: ProfileBody) -> Result<ValidProfile, AppError> {
    let organization_name = non_empty(body.organization_name).ok_or_else(|| {
        AppError::invalid("MISSING_ORGANIZATION_NAME", "Organization name is required")
    })?;

    let category = non_empty(body.category)
        .ok_or_else(|| AppError::invalid("MISSING_CATEGORY", "Category is required"))?;
    let category = OrgCategory::parse(&category).ok_or_else(|| {
        let allowed: Vec<&str> = OrgCategory::ALL.iter().map(|c| c.as_str()).collect();
        AppError::invalid(
            "INVALID_CATEGORY",
            format!("Invalid category. Must be one of: {}", allowed.join(", ")),
        )
    })?;

    let mobile_number = non_empty(body.mobile_number)
        .ok_or_else(|| AppError::invalid("MISSING_MOBILE_NUMBER", "Mobile number is required"))?;
    if !MOBILE_RE.is_match(&mobile_number) {
        return Err(AppError::invalid("INVALID_MOBILE_NUMBER", "Invalid mobile number format"));
    }

    Ok(ValidProfile {
        organization_name,
        category,
        mobile_number,
    })
}

// POST /api/user-profile
pub async fn post_profile(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    JsonBody(body): JsonBody<ProfileBody>,
) -> Result<impl IntoResponse, AppError> {
    let u = require_user(user)?;
    let p = validate_profile(body)?;

    let profile = user_service::create_profile(
        &state,
        &u.id,
        &p.organization_name,
        p.category,
        &p.mobile_number,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

// GET /api/user-profile
pub async fn get_profile(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
) -> Result<Json<UserProfile>, AppError> {
    let u = require_user(user)?;
    user_service::get_profile(&state, &u.id).await.map(Json)
}

// GET /api/user-profile/:user_id
pub async fn get_profile_by_user(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, AppError> {
    let u = require_user(user)?;

    if user_id.trim() != u.id {
        return Err(AppError::forbidden(
            "FORBIDDEN",
            "You can only access your own profile",
        ));
    }

    user_service::get_profile(&state, &u.id).await.map(Json)
}
