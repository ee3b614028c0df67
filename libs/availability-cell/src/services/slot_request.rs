use anyhow::Result;
use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::backend::{BackendClient, BackendError};
use shared_models::auth::Session;

use crate::error::AvailabilityError;
use crate::models::{
    AvailabilitySlotRequest, CreateSlotRequest, ReviewDecision, SlotRequestFilter,
    SlotRequestRecord, StatusKind,
};

const REQUESTS_PATH: &str = "/api/availability-requests";

pub struct SlotRequestService {
    backend: BackendClient,
}

impl SlotRequestService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    /// Submit a new slot for admin review, on behalf of the session's doctor
    pub async fn submit(
        &self,
        request: CreateSlotRequest,
        session: &Session,
    ) -> Result<AvailabilitySlotRequest> {
        request.validate(Utc::now().date_naive())?;
        debug!("Doctor {} requesting slot {} on {}", session.user_id(), request.slot(), request.date);

        let body = json!({
            "doctorId": session.user_id(),
            "date": request.date.format("%Y-%m-%d").to_string(),
            "startTime": request.start_time,
            "endTime": request.end_time,
            "status": StatusKind::Pending,
        });

        let created: AvailabilitySlotRequest = self.backend.request(
            Method::POST,
            REQUESTS_PATH,
            Some(session.token()),
            Some(body),
        ).await?;

        Ok(created)
    }

    pub async fn list(
        &self,
        filter: &SlotRequestFilter,
        session: &Session,
    ) -> Result<Vec<AvailabilitySlotRequest>> {
        let mut query = Vec::new();
        if let Some(doctor_id) = filter.doctor_id.as_deref() {
            query.push(("doctorId", doctor_id));
        }
        if let Some(status) = filter.status {
            query.push(("status", status.as_str()));
        }

        let requests: Vec<AvailabilitySlotRequest> = self.backend.request_with_query(
            Method::GET,
            REQUESTS_PATH,
            &query,
            Some(session.token()),
            None,
        ).await?;

        Ok(requests)
    }

    pub async fn get(&self, request_id: &str, session: &Session) -> Result<AvailabilitySlotRequest> {
        let request: AvailabilitySlotRequest = self.backend.request(
            Method::GET,
            &format!("{}/{}", REQUESTS_PATH, request_id),
            Some(session.token()),
            None,
        ).await?;

        Ok(request)
    }

    /// Approve or reject a pending request. Each request is reviewed exactly once.
    pub async fn review(
        &self,
        request_id: &str,
        decision: ReviewDecision,
        notes: Option<String>,
        session: &Session,
    ) -> Result<AvailabilitySlotRequest> {
        let mut request = self.get(request_id, session).await?;

        let now = Utc::now();
        let outcome = match decision {
            ReviewDecision::Approve => request.approve(notes, now),
            ReviewDecision::Reject => request.reject(notes, now),
        };
        if let Err(e) = outcome {
            warn!("Refusing to review request {}: {}", request_id, e);
            return Err(e.into());
        }

        // The backend applies the update only while the stored status is still
        // pending, so a concurrent review by another admin surfaces as a 409.
        let record = SlotRequestRecord::from(request);
        let updated: AvailabilitySlotRequest = self.backend.request(
            Method::PATCH,
            &format!("{}/{}", REQUESTS_PATH, request_id),
            Some(session.token()),
            Some(json!({
                "status": record.status,
                "adminNotes": record.admin_notes,
                "reviewedAt": record.reviewed_at,
                "expectedStatus": StatusKind::Pending,
            })),
        ).await.map_err(|e| {
            let conflict = matches!(
                e.downcast_ref::<BackendError>(),
                Some(BackendError::Api { status: 409, .. })
            );
            if conflict {
                warn!("Request {} was reviewed concurrently", request_id);
                anyhow::Error::new(AvailabilityError::AlreadyReviewed(
                    "reviewed by another admin".to_string(),
                ))
            } else {
                e
            }
        })?;

        info!("Request {} {} by admin {}", request_id, record.status, session.user_id());
        Ok(updated)
    }

    /// Delete a request; only its doctor may do so, and only while it is pending
    pub async fn withdraw(&self, request_id: &str, session: &Session) -> Result<()> {
        let request = self.get(request_id, session).await?;
        request.ensure_withdrawable_by(session.user_id())?;

        self.backend.request_no_content(
            Method::DELETE,
            &format!("{}/{}", REQUESTS_PATH, request_id),
            Some(session.token()),
            None,
        ).await?;

        info!("Request {} withdrawn by doctor {}", request_id, session.user_id());
        Ok(())
    }
}
