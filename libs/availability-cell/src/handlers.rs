use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{Session, User};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::error::into_app_error;
use crate::models::{
    parse_calendar_date, CreateSlotRequest, ReviewDecision, ReviewSlotRequest, SlotRequestFilter,
    SpecificDateOverride, StatusKind, UpdateWeeklyAvailabilityRequest,
};
use crate::services::{
    availability::AvailabilityService, selection::NOT_AVAILABLE_NOTICE,
    slot_request::SlotRequestService,
};

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct SlotRequestQuery {
    pub status: Option<String>,
    pub doctor_id: Option<String>,
}

/// Doctors may only edit their own schedule.
fn ensure_own_schedule(user: &User, doctor_id: &str) -> Result<(), AppError> {
    require_role(user, "doctor")?;
    if user.id != doctor_id {
        return Err(AppError::Forbidden("Doctors can only manage their own availability".to_string()));
    }
    Ok(())
}

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn get_doctor_availability_public(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let availability = availability_service.get_doctor_availability(&doctor_id, None).await
        .map_err(into_app_error)?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn get_available_slots_public(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let resolution = availability_service.get_available_slots(&doctor_id, &query.date, None).await
        .map_err(into_app_error)?;

    let message = (!resolution.is_available()).then_some(NOT_AVAILABLE_NOTICE);

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": resolution.date,
        "weekday": resolution.weekday,
        "source": resolution.source,
        "available": resolution.is_available(),
        "slots": resolution.slots,
        "total_slots": resolution.slots.len(),
        "message": message
    })))
}

// ==============================================================================
// PROTECTED SCHEDULE HANDLERS (DOCTOR ONLY)
// ==============================================================================

#[axum::debug_handler]
pub async fn update_weekly_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<String>,
    Json(request): Json<UpdateWeeklyAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    ensure_own_schedule(&user, &doctor_id)?;
    let session = Session::new(user, auth.token());

    let availability = AvailabilityService::new(&state)
        .replace_weekly_availability(&doctor_id, request.weekly_availability, &session).await
        .map_err(into_app_error)?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn upsert_date_override(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<String>,
    Json(request): Json<SpecificDateOverride>,
) -> Result<Json<Value>, AppError> {
    ensure_own_schedule(&user, &doctor_id)?;
    let session = Session::new(user, auth.token());

    let availability = AvailabilityService::new(&state)
        .upsert_date_override(&doctor_id, request, &session).await
        .map_err(into_app_error)?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn delete_date_override(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path((doctor_id, date)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    ensure_own_schedule(&user, &doctor_id)?;
    let date = parse_calendar_date(&date)?;
    let session = Session::new(user, auth.token());

    let availability = AvailabilityService::new(&state)
        .remove_date_override(&doctor_id, date, &session).await
        .map_err(into_app_error)?;

    Ok(Json(json!(availability)))
}

// ==============================================================================
// SLOT REQUEST HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_slot_request(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateSlotRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, "doctor")?;
    let session = Session::new(user, auth.token());

    let created = SlotRequestService::new(&state).submit(request, &session).await
        .map_err(into_app_error)?;

    Ok((StatusCode::CREATED, Json(json!(created))))
}

#[axum::debug_handler]
pub async fn list_slot_requests(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<SlotRequestQuery>,
) -> Result<Json<Value>, AppError> {
    let status = query.status.as_deref()
        .map(str::parse::<StatusKind>)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    // Doctors only ever see their own requests; admins may filter by doctor.
    let doctor_id = if user.is_admin() {
        query.doctor_id
    } else if user.is_doctor() {
        Some(user.id.clone())
    } else {
        return Err(AppError::Forbidden("Only doctors and administrators can view availability requests".to_string()));
    };

    let filter = SlotRequestFilter { doctor_id, status };
    let session = Session::new(user, auth.token());

    let requests = SlotRequestService::new(&state).list(&filter, &session).await
        .map_err(into_app_error)?;

    Ok(Json(json!({
        "requests": requests,
        "total": requests.len()
    })))
}

async fn review_slot_request(
    state: &AppConfig,
    token: &str,
    user: User,
    request_id: &str,
    decision: ReviewDecision,
    body: ReviewSlotRequest,
) -> Result<Json<Value>, AppError> {
    require_role(&user, "admin")?;
    let session = Session::new(user, token);

    let reviewed = SlotRequestService::new(state)
        .review(request_id, decision, body.notes, &session).await
        .map_err(into_app_error)?;

    Ok(Json(json!(reviewed)))
}

#[axum::debug_handler]
pub async fn approve_slot_request(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
    body: Option<Json<ReviewSlotRequest>>,
) -> Result<Json<Value>, AppError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    review_slot_request(&state, auth.token(), user, &request_id, ReviewDecision::Approve, body).await
}

#[axum::debug_handler]
pub async fn reject_slot_request(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
    body: Option<Json<ReviewSlotRequest>>,
) -> Result<Json<Value>, AppError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    review_slot_request(&state, auth.token(), user, &request_id, ReviewDecision::Reject, body).await
}

#[axum::debug_handler]
pub async fn withdraw_slot_request(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
) -> Result<StatusCode, AppError> {
    require_role(&user, "doctor")?;
    let session = Session::new(user, auth.token());

    SlotRequestService::new(&state).withdraw(&request_id, &session).await
        .map_err(into_app_error)?;

    Ok(StatusCode::NO_CONTENT)
}
