use axum::{Router, routing::get};
use crate::{AppState, controllers::dustbin_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/dustbins",
            get(dustbin_controller::list).post(dustbin_controller::create),
        )
        .route(
            "/api/dustbins/:id",
            get(dustbin_controller::get_one)
                .put(dustbin_controller::update)
                .delete(dustbin_controller::delete),
        )
}
