#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, header},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::Value;
use waste_wizard::{
    AppState, config,
    models::{CurrentUser, FillStatus, timestamp_now},
    services::{auth_service, db_init},
};

pub const DEVICE_KEY: &str = "test-device-key";

pub async fn test_state() -> AppState {
    let mut settings = config::load();
    settings.database_url = "sqlite::memory:".to_string();
    settings.jwt_secret = "test-jwt-secret".to_string();
    settings.hardware_api_key = Some(DEVICE_KEY.to_string());

    let db = db_init::connect(&settings).await.expect("in-memory sqlite");
    AppState::new(db, settings)
}

pub async fn response_body_string(res: Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

pub async fn response_json(res: Response) -> Value {
    let body = response_body_string(res).await;
    serde_json::from_str(&body).unwrap_or_else(|e| panic!("not json ({e}): {body}"))
}

/// Inserts a user directly; the password hash is never checked by these tests.
pub async fn seed_user(state: &AppState, id: &str) -> CurrentUser {
    let now = timestamp_now();
    let email = format!("{id}@example.com");
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, created_at, updated_at) VALUES (?, ?, ?, 'x', ?, ?)",
    )
    .bind(id)
    .bind(format!("User {id}"))
    .bind(&email)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .unwrap();

    CurrentUser {
        id: id.to_string(),
        email,
        name: format!("User {id}"),
    }
}

pub async fn seed_dustbin(state: &AppState, user_id: &str, name: &str, fill_level: i64) -> i64 {
    let now = timestamp_now();
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO dustbins
            (user_id, name, kind, location_name, latitude, longitude,
             fill_level, status, is_active, created_at, updated_at)
        VALUES (?, ?, 'dry', 'Main gate', '12.97', '77.59', ?, ?, 1, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(fill_level)
    .bind(FillStatus::from_fill_level(fill_level))
    .bind(&now)
    .bind(&now)
    .fetch_one(&state.db)
    .await
    .unwrap();
    id
}

pub async fn bin_fill(state: &AppState, id: i64) -> (i64, String) {
    sqlx::query_as("SELECT fill_level, status FROM dustbins WHERE id = ?")
        .bind(id)
        .fetch_one(&state.db)
        .await
        .unwrap()
}

pub async fn alert_count(state: &AppState, dustbin_id: i64) -> i64 {
    let (n,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE dustbin_id = ? AND kind = 'alert'")
            .bind(dustbin_id)
            .fetch_one(&state.db)
            .await
            .unwrap();
    n
}

pub fn bearer(state: &AppState, user: &CurrentUser) -> String {
    let token = auth_service::make_jwt_with_days(&state.settings, &user.id, 1).unwrap();
    format!("Bearer {token}")
}

pub fn json_request(method: &str, uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut b = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        b = b.header(header::AUTHORIZATION, auth);
    }
    b.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().method("GET").uri(uri);
    if let Some(auth) = auth {
        b = b.header(header::AUTHORIZATION, auth);
    }
    b.body(Body::empty()).unwrap()
}
