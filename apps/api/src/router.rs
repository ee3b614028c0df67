use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use availability_cell::router::{availability_routes, slot_request_routes};
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Doctor Availability API is running!" }))
        .nest("/doctors", availability_routes(state.clone()))
        .nest("/availability-requests", slot_request_routes(state))
}
