mod common;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;
use waste_wizard::routes;

use common::{
    alert_count, bearer, get_request, json_request, response_json, seed_dustbin, seed_user, test_state,
};

#[tokio::test]
async fn owner_routes_require_a_session() {
    let state = test_state().await;

    let res = routes::app(state).oneshot(get_request("/api/dustbins", None)).await.unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response_json(res).await["code"], "AUTHENTICATION_REQUIRED");
}

#[tokio::test]
async fn create_then_fetch_dustbin() {
    let state = test_state().await;
    let owner = seed_user(&state, "dust-1").await;
    let auth = bearer(&state, &owner);

    let req = json_request(
        "POST",
        "/api/dustbins",
        Some(&auth),
        json!({
            "name": " Gate 3 ", "type": "wet", "locationName": "North gate",
            "latitude": "12.97", "longitude": "77.59"
        }),
    );
    let res = routes::app(state.clone()).oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let created = response_json(res).await;
    assert_eq!(created["name"], "Gate 3");
    assert_eq!(created["type"], "wet");
    assert_eq!(created["fillLevel"], 0);
    assert_eq!(created["status"], "empty");
    assert_eq!(created["isActive"], true);

    let id = created["id"].as_i64().unwrap();
    let res = routes::app(state)
        .oneshot(get_request(&format!("/api/dustbins/{id}"), Some(&auth)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(response_json(res).await["locationName"], "North gate");
}

#[tokio::test]
async fn body_cannot_choose_the_owner() {
    let state = test_state().await;
    let owner = seed_user(&state, "dust-2").await;

    let req = json_request(
        "POST",
        "/api/dustbins",
        Some(&bearer(&state, &owner)),
        json!({
            "name": "X", "type": "dry", "locationName": "Y",
            "latitude": "1", "longitude": "2", "userId": "someone-else"
        }),
    );
    let res = routes::app(state).oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(res).await["code"], "USER_ID_NOT_ALLOWED");
}

#[tokio::test]
async fn other_users_bins_are_invisible() {
    let state = test_state().await;
    let alice = seed_user(&state, "alice").await;
    let bob = seed_user(&state, "bob").await;
    let bin = seed_dustbin(&state, &alice.id, "Alice bin", 10).await;

    let res = routes::app(state.clone())
        .oneshot(get_request(&format!("/api/dustbins/{bin}"), Some(&bearer(&state, &bob))))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_json(res).await["code"], "DUSTBIN_NOT_FOUND");

    let res = routes::app(state.clone())
        .oneshot(get_request("/api/dustbins", Some(&bearer(&state, &bob))))
        .await
        .unwrap();
    assert_eq!(response_json(res).await, json!([]));
}

#[tokio::test]
async fn list_filters_by_status_alias_and_search() {
    let state = test_state().await;
    let owner = seed_user(&state, "dust-3").await;
    let auth = bearer(&state, &owner);
    seed_dustbin(&state, &owner.id, "Canteen", 60).await;
    seed_dustbin(&state, &owner.id, "Library", 10).await;
    seed_dustbin(&state, &owner.id, "Canteen annex", 90).await;

    let res = routes::app(state.clone())
        .oneshot(get_request("/api/dustbins?status=75", Some(&auth)))
        .await
        .unwrap();
    let items = response_json(res).await;
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["name"], "Canteen");

    let res = routes::app(state.clone())
        .oneshot(get_request("/api/dustbins?search=canteen&limit=1", Some(&auth)))
        .await
        .unwrap();
    let items = response_json(res).await;
    assert_eq!(items.as_array().unwrap().len(), 1);

    let res = routes::app(state)
        .oneshot(get_request("/api/dustbins?status=overflowing", Some(&auth)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn owner_edit_rederives_status_without_alerting() {
    let state = test_state().await;
    let owner = seed_user(&state, "dust-4").await;
    let auth = bearer(&state, &owner);
    let bin = seed_dustbin(&state, &owner.id, "Park", 10).await;

    let req = json_request("PUT", &format!("/api/dustbins/{bin}"), Some(&auth), json!({ "fillLevel": 95 }));
    let res = routes::app(state.clone()).oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_json(res).await;
    assert_eq!(body["fillLevel"], 95);
    assert_eq!(body["status"], "full");
    assert_eq!(alert_count(&state, bin).await, 0);

    let req = json_request("PUT", &format!("/api/dustbins/{bin}"), Some(&auth), json!({ "status": "empty" }));
    let res = routes::app(state).oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(res).await["code"], "STATUS_IS_DERIVED");
}

#[tokio::test]
async fn delete_is_a_soft_delete() {
    let state = test_state().await;
    let owner = seed_user(&state, "dust-5").await;
    let auth = bearer(&state, &owner);
    let bin = seed_dustbin(&state, &owner.id, "Old bin", 10).await;

    let req = json_request("DELETE", &format!("/api/dustbins/{bin}"), Some(&auth), json!({}));
    let res = routes::app(state.clone()).oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_json(res).await;
    assert!(body["message"].is_string());
    assert_eq!(body["dustbin"]["isActive"], false);

    let res = routes::app(state)
        .oneshot(get_request("/api/dustbins?is_active=0", Some(&auth)))
        .await
        .unwrap();
    assert_eq!(response_json(res).await[0]["id"], bin);
}

#[tokio::test]
async fn non_numeric_id_is_rejected() {
    let state = test_state().await;
    let owner = seed_user(&state, "dust-6").await;

    let res = routes::app(state.clone())
        .oneshot(get_request("/api/dustbins/abc", Some(&bearer(&state, &owner))))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(res).await["code"], "INVALID_ID");
}
