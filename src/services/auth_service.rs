use axum_extra::extract::cookie::{Cookie, SameSite};
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState,
    config::Settings,
    error::AppError,
    models::{User, timestamp_now},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    // user id
    pub sub: String,
    // expiry (unix timestamp seconds)
    pub exp: usize,
}

pub fn make_jwt_with_days(settings: &Settings, user_id: &str, days: i64) -> Result<String, AppError> {
    let exp = (Utc::now() + Duration::days(days)).timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("token error: {e}")))
}

/// Returns the user id of a valid, unexpired token.
pub fn verify_jwt(settings: &Settings, token: &str) -> Option<String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims.sub)
    .map_err(|e| tracing::debug!(error = %e, "rejected session token"))
    .ok()
}

pub fn auth_cookie(settings: &Settings, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(settings.jwt_cookie_name.clone(), token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    if settings.cookie_secure {
        cookie.set_secure(true);
    }
    cookie
}

pub fn clear_auth_cookie(settings: &Settings) -> Cookie<'static> {
    let mut cookie = Cookie::new(settings.jwt_cookie_name.clone(), "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.make_removal();
    cookie
}

pub async fn find_user(state: &AppState, user_id: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?;
    Ok(user)
}

pub async fn login_user(state: &AppState, email: &str, password: &str) -> Result<User, AppError> {
    let invalid = || AppError::unauthorized("INVALID_CREDENTIALS", "Invalid email or password.");

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email.to_lowercase())
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(invalid)?;

    let password = password.to_string();
    let pw_hash = user.password_hash.clone();
    let ok = tokio::task::spawn_blocking(move || verify(password, &pw_hash).unwrap_or(false))
        .await
        .map_err(|e| AppError::internal(format!("password check failed: {e}")))?;

    if !ok {
        tracing::info!(user_id = %user.id, "login rejected: bad password");
        return Err(invalid());
    }

    Ok(user)
}

pub async fn register_user(
    state: &AppState,
    name: &str,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let email = email.to_lowercase();
    let taken = || AppError::conflict("EMAIL_TAKEN", "Email has already been taken!");

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(taken());
    }

    let password = password.to_string();
    let pw_hash = tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST))
        .await
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))?
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))?;

    let now = timestamp_now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email,
        password_hash: pw_hash,
        created_at: now.clone(),
        updated_at: now,
    };

    let res = sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(&state.db)
    .await;

    match res {
        Ok(_) => {}
        // lost a race with a concurrent registration for the same email
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => return Err(taken()),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user_id = %user.id, "registered user");
    Ok(user)
}
