use axum::Router;
use axum::middleware::from_fn_with_state;
use tower_http::trace::TraceLayer;

use crate::{AppState, auth, controllers::home_controller};

pub mod home_routes;
pub mod auth_routes;
pub mod user_routes;
pub mod dustbin_routes;
pub mod notification_routes;
pub mod collection_routes;
pub mod analytics_routes;
pub mod hardware_routes;
pub mod realtime_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = auth_routes::add_routes(router);
    let router = user_routes::add_routes(router);
    let router = dustbin_routes::add_routes(router);
    let router = notification_routes::add_routes(router);
    let router = collection_routes::add_routes(router);
    let router = analytics_routes::add_routes(router);
    let router = hardware_routes::add_routes(router);
    let router = realtime_routes::add_routes(router);

    // layers run bottom-up: the user is injected before the guard looks
    router
        .fallback(home_controller::not_found)
        .layer(from_fn_with_state(state.clone(), auth::require_auth))
        .layer(from_fn_with_state(state.clone(), auth::inject_current_user))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
