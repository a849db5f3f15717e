use axum::{Router, routing::get};
use crate::{AppState, controllers::analytics_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/analytics",
            get(analytics_controller::list).post(analytics_controller::create),
        )
        .route("/api/analytics/summary", get(analytics_controller::summary))
}
