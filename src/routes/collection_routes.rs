use axum::{Router, routing::get};
use crate::{AppState, controllers::collection_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/collections",
            get(collection_controller::list).post(collection_controller::create),
        )
        .route(
            "/api/collections/:id",
            get(collection_controller::get_one)
                .put(collection_controller::update)
                .delete(collection_controller::delete),
        )
}
