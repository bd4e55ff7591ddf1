use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware::{from_fn_with_state, map_response},
    routing::{get, post},
    Router,
};
use tower_http::timeout::TimeoutLayer;

use crate::{handler::*, middleware::mw_require_auth, AppState};

pub fn create_router(app_state: Arc<AppState>, request_timeout: Duration) -> Router {
    let app = Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/:id", get(get_item))
        .route("/me", get(me))
        .route_layer(from_fn_with_state(app_state.clone(), mw_require_auth))
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/refresh", get(refresh))
        .route("/signout", post(signout))
        .route("/", get(health_checker_handler))
        .with_state(app_state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(map_response(timeout_as_json));
    app
}
