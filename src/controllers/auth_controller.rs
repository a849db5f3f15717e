use std::sync::LazyLock;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    controllers::JsonBody,
    error::{AppError, FieldErrors},
    models::{CurrentUser, User},
    services::auth_service,
};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn signed_in(state: &AppState, jar: CookieJar, user: User, status: StatusCode) -> Result<Response, AppError> {
    let token = auth_service::make_jwt_with_days(&state.settings, &user.id, state.settings.session_days)?;
    let jar = jar.add(auth_service::auth_cookie(&state.settings, token.clone()));

    Ok((
        status,
        jar,
        Json(json!({ "user": CurrentUser::from(user), "token": token })),
    )
        .into_response())
}

// ---------------- LOGIN ----------------

#[derive(Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn post_login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(body): JsonBody<LoginBody>,
) -> Result<Response, AppError> {
    let email = body.email.trim().to_string();
    let password = body.password.trim().to_string();

    let mut errors = FieldErrors::new();

    if email.is_empty() {
        errors.insert("email".into(), "Email is required.".into());
    } else if !is_valid_email(&email) {
        errors.insert("email".into(), "Invalid email.".into());
    }

    if password.is_empty() {
        errors.insert("password".into(), "Password is required.".into());
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let user = auth_service::login_user(&state, &email, &password).await?;
    signed_in(&state, jar, user, StatusCode::OK)
}

// ---------------- REGISTER ----------------

#[derive(Deserialize)]
pub struct RegisterBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,

    #[serde(default, rename = "rePassword")]
    pub re_password: Option<String>,
}

pub fn validate_registration(body: &RegisterBody) -> FieldErrors {
    let name = body.name.trim();
    let email = body.email.trim();
    let password = body.password.trim();
    let re_password = body.re_password.as_deref().unwrap_or("").trim();

    let mut errors = FieldErrors::new();

    if name.is_empty() {
        errors.insert("name".into(), "Name is required.".into());
    } else if name.chars().count() < 2 {
        errors.insert("name".into(), "Name must be at least 2 characters.".into());
    }

    if email.is_empty() {
        errors.insert("email".into(), "Email is required.".into());
    } else if !is_valid_email(email) {
        errors.insert("email".into(), "Invalid email.".into());
    }

    if password.is_empty() {
        errors.insert("password".into(), "Password is required.".into());
    } else if password.chars().count() < 6 {
        errors.insert("password".into(), "Password must be at least 6 characters.".into());
    }

    if re_password.is_empty() {
        errors.insert("rePassword".into(), "Repeat password is required.".into());
    } else if password != re_password {
        errors.insert("rePassword".into(), "Passwords do not match.".into());
    }

    errors
}

pub async fn post_register(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(body): JsonBody<RegisterBody>,
) -> Result<Response, AppError> {
    let errors = validate_registration(&body);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let user = auth_service::register_user(
        &state,
        body.name.trim(),
        body.email.trim(),
        body.password.trim(),
    )
    .await?;

    signed_in(&state, jar, user, StatusCode::CREATED)
}

// ---------------- LOGOUT ----------------

pub async fn post_logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(auth_service::clear_auth_cookie(&state.settings));
    (jar, Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(name: &str, email: &str, pw: &str, re: &str) -> RegisterBody {
        RegisterBody {
            name: name.into(),
            email: email.into(),
            password: pw.into(),
            re_password: Some(re.into()),
        }
    }

    #[test]
    fn valid_registration_has_no_errors() {
        assert!(validate_registration(&body("Ana", "ana@example.com", "123456", "123456")).is_empty());
    }

    #[test]
    fn short_fields_and_mismatch_are_reported_together() {
        let errs = validate_registration(&body("a", "nope", "123", "321"));
        assert!(errs["name"].contains("at least 2 characters"));
        assert_eq!(errs["email"], "Invalid email.");
        assert!(errs["password"].contains("at least 6 characters"));
        assert_eq!(errs["rePassword"], "Passwords do not match.");
    }
}
