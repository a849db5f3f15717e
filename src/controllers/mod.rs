pub mod home_controller;
pub mod auth_controller;
pub mod user_controller;
pub mod dustbin_controller;
pub mod notification_controller;
pub mod collection_controller;
pub mod analytics_controller;
pub mod hardware_controller;
pub mod realtime_controller;

use axum::{
    async_trait,
    body::Bytes,
    extract::{Extension, FromRequest, Request},
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::{error::AppError, models::CurrentUser};

/// Session user or `401 AUTHENTICATION_REQUIRED`.
pub fn require_user(user: Option<Extension<CurrentUser>>) -> Result<CurrentUser, AppError> {
    user.map(|Extension(u)| u).ok_or_else(AppError::auth_required)
}

pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::invalid("INVALID_ID", "Valid ID is required"))
}

/// JSON object body with our error shape instead of axum's plain-text
/// rejections. Bodies that try to set the owner are refused outright.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::invalid("INVALID_JSON", e.body_text()))?;

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::invalid("INVALID_JSON", format!("Invalid JSON body: {e}")))?;

        let Some(obj) = value.as_object() else {
            return Err(AppError::invalid("INVALID_JSON", "JSON body must be an object"));
        };

        if obj.contains_key("userId") || obj.contains_key("user_id") {
            return Err(AppError::invalid(
                "USER_ID_NOT_ALLOWED",
                "User ID cannot be provided in request body",
            ));
        }

        serde_json::from_value(value)
            .map(JsonBody)
            .map_err(|e| AppError::invalid("INVALID_JSON", format!("Invalid JSON body: {e}")))
    }
}

/// Integer given as a JSON number or a numeric string.
pub fn loose_int(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn loose_float(v: &Value) -> Option<f64> {
    let f = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    f.filter(|f| f.is_finite())
}

/// `true`/`false` or `1`/`0`.
pub fn loose_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Keeps an explicit `null` as `Some(Value::Null)`; use with
/// `#[serde(default, deserialize_with = "present")]`.
pub fn present<'de, D>(d: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(d).map(Some)
}

/// `Some(v)` when the field should change: `null` clears it.
pub fn nullable_text(v: Option<Value>) -> Option<Option<String>> {
    match v? {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s.trim().to_string())),
        other => Some(Some(other.to_string())),
    }
}

pub fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
