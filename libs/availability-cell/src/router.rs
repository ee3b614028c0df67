use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put, delete},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Mounted under `/doctors`.
pub fn availability_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/{doctor_id}/availability", get(handlers::get_doctor_availability_public))
        .route("/{doctor_id}/slots", get(handlers::get_available_slots_public));

    let protected_routes = Router::new()
        .route("/{doctor_id}/availability/weekly", put(handlers::update_weekly_availability))
        .route("/{doctor_id}/availability/dates", put(handlers::upsert_date_override))
        .route("/{doctor_id}/availability/dates/{date}", delete(handlers::delete_date_override))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Mounted under `/availability-requests`; every route requires a token.
pub fn slot_request_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::create_slot_request).get(handlers::list_slot_requests))
        .route("/{request_id}", delete(handlers::withdraw_slot_request))
        .route("/{request_id}/approve", post(handlers::approve_slot_request))
        .route("/{request_id}/reject", post(handlers::reject_slot_request))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
