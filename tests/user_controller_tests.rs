mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    routing::get,
};
use serde_json::json;
use tower::ServiceExt;
use waste_wizard::{controllers::user_controller, routes};

use common::{bearer, get_request, json_request, response_json, seed_user, test_state};

#[tokio::test]
async fn me_without_user_is_unauthorized() {
    let state = test_state().await;
    let app = Router::new()
        .route("/me", get(user_controller::me))
        .with_state(state);

    let req = Request::builder().uri("/me").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response_json(res).await["code"], "AUTHENTICATION_REQUIRED");
}

#[tokio::test]
async fn me_with_user_returns_json() {
    let state = test_state().await;
    let user = seed_user(&state, "u-me").await;
    let app = Router::new()
        .route("/me", get(user_controller::me))
        .with_state(state);

    let mut req = Request::builder().uri("/me").body(Body::empty()).unwrap();
    req.extensions_mut().insert(user.clone());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_json(res).await;
    assert_eq!(body["id"], user.id.as_str());
    assert_eq!(body["email"], "u-me@example.com");
}

#[tokio::test]
async fn profile_create_and_read_back() {
    let state = test_state().await;
    let user = seed_user(&state, "u-prof").await;
    let auth = bearer(&state, &user);

    let body = json!({
        "organization_name": "Green Campus", "category": "College", "mobile_number": "+91 98765-43210"
    });
    let res = routes::app(state.clone())
        .oneshot(json_request("POST", "/api/user-profile", Some(&auth), body.clone()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(response_json(res).await["organizationName"], "Green Campus");

    let res = routes::app(state.clone())
        .oneshot(json_request("POST", "/api/user-profile", Some(&auth), body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(response_json(res).await["code"], "PROFILE_EXISTS");

    let res = routes::app(state.clone())
        .oneshot(get_request(&format!("/api/user-profile/{}", user.id), Some(&auth)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(response_json(res).await["category"], "College");

    let res = routes::app(state)
        .oneshot(get_request("/api/user-profile/someone-else", Some(&auth)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_profile_is_not_found() {
    let state = test_state().await;
    let user = seed_user(&state, "u-none").await;

    let res = routes::app(state.clone())
        .oneshot(get_request("/api/user-profile", Some(&bearer(&state, &user))))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_json(res).await["code"], "PROFILE_NOT_FOUND");
}

#[tokio::test]
async fn profile_rejects_bad_mobile_number() {
    let state = test_state().await;
    let user = seed_user(&state, "u-bad").await;

    let res = routes::app(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/user-profile",
            Some(&bearer(&state, &user)),
            json!({ "organization_name": "Org", "category": "Cafe", "mobile_number": "call me" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(res).await["code"], "INVALID_MOBILE_NUMBER");
}

#[tokio::test]
async fn event_stream_needs_a_session() {
    let state = test_state().await;

    let res = routes::app(state).oneshot(get_request("/events", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
