use axum::{Router, routing::{get, put}};
use crate::{AppState, controllers::notification_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/notifications",
            get(notification_controller::list).post(notification_controller::create),
        )
        .route(
            "/api/notifications/:id",
            put(notification_controller::update).delete(notification_controller::delete),
        )
        .route("/api/notifications/:id/read", put(notification_controller::mark_read))
}
