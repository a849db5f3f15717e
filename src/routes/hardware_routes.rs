use axum::{Router, routing::get};
use crate::{AppState, controllers::hardware_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route(
        "/api/hardware/dustbin-update",
        get(hardware_controller::get_dustbin_update_health)
            .post(hardware_controller::post_dustbin_update),
    )
}
