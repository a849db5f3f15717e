use axum::{Router, routing::get};
use crate::{AppState, controllers::user_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/me", get(user_controller::me))
        .route(
            "/api/user-profile",
            get(user_controller::get_profile).post(user_controller::post_profile),
        )
        .route("/api/user-profile/:user_id", get(user_controller::get_profile_by_user))
}
