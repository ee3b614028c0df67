use thiserror::Error;
use tracing::error;

use shared_database::backend::BackendError;
use shared_models::error::AppError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unknown weekday: {0}")]
    InvalidWeekday(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid time slot {start}-{end}: start must be before end")]
    InvalidTimeSlot { start: String, end: String },

    #[error("Weekday {0} is configured more than once")]
    DuplicateWeekday(String),

    #[error("Date {0} has more than one override")]
    DuplicateOverrideDate(String),

    #[error("No override exists for {0}")]
    OverrideNotFound(String),

    #[error("Date {0} is in the past")]
    DateInPast(String),

    #[error("Unknown request status: {0}")]
    UnknownStatus(String),

    #[error("Request has already been {0}")]
    AlreadyReviewed(String),

    #[error("Only pending requests can be withdrawn (current status: {0})")]
    NotPending(String),

    #[error("Request belongs to another doctor")]
    NotOwner,

    #[error("No date has been selected")]
    NoDateSelected,

    #[error("Slot {0} is not offered on the selected date")]
    SlotNotOffered(String),
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::NotOwner => AppError::Forbidden(err.to_string()),
            AvailabilityError::OverrideNotFound(_) => AppError::NotFound(err.to_string()),
            AvailabilityError::AlreadyReviewed(_) | AvailabilityError::NotPending(_) => {
                AppError::Conflict(err.to_string())
            }
            AvailabilityError::UnknownStatus(_) => AppError::ExternalService(err.to_string()),
            _ => AppError::ValidationError(err.to_string()),
        }
    }
}

/// Maps a service failure onto the HTTP error it should surface as.
pub fn into_app_error(err: anyhow::Error) -> AppError {
    if let Some(domain) = err.downcast_ref::<AvailabilityError>() {
        return domain.clone().into();
    }

    match err.downcast_ref::<BackendError>() {
        Some(BackendError::NotFound(_)) => AppError::NotFound("Resource not found".to_string()),
        Some(BackendError::Unauthorized(msg)) => AppError::Auth(msg.clone()),
        _ => {
            error!("Backend call failed: {:#}", err);
            AppError::ExternalService("Failed to load availability data".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_domain_errors_map_to_http_errors() {
        assert!(matches!(
            AppError::from(AvailabilityError::InvalidDate("nope".into())),
            AppError::ValidationError(_)
        ));
        assert!(matches!(
            AppError::from(AvailabilityError::AlreadyReviewed("approved".into())),
            AppError::Conflict(_)
        ));
        assert!(matches!(AppError::from(AvailabilityError::NotOwner), AppError::Forbidden(_)));
    }

    #[test]
    fn test_into_app_error_downcasts() {
        let domain = anyhow::Error::new(AvailabilityError::NotPending("rejected".into()));
        assert!(matches!(into_app_error(domain), AppError::Conflict(_)));

        let missing = anyhow::Error::new(BackendError::NotFound("gone".into()));
        assert!(matches!(into_app_error(missing), AppError::NotFound(_)));

        assert!(matches!(into_app_error(anyhow!("connection reset")), AppError::ExternalService(_)));
    }
}
