use anyhow::Result;
use chrono::NaiveDate;
use reqwest::Method;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::backend::BackendClient;
use shared_models::auth::Session;

use crate::error::AvailabilityError;
use crate::models::{
    parse_calendar_date, validate_weekly, DoctorAvailability, SpecificDateOverride,
    WeeklyAvailability,
};
use crate::services::resolver::Resolution;

pub struct AvailabilityService {
    backend: BackendClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    fn availability_path(doctor_id: &str) -> String {
        format!("/api/doctors/{}/availability", doctor_id)
    }

    /// Fetch a doctor's weekly pattern and date overrides
    pub async fn get_doctor_availability(
        &self,
        doctor_id: &str,
        session: Option<&Session>,
    ) -> Result<DoctorAvailability> {
        debug!("Fetching availability for doctor: {}", doctor_id);

        let mut availability: DoctorAvailability = self.backend.request(
            Method::GET,
            &Self::availability_path(doctor_id),
            session.map(Session::token),
            None,
        ).await?;

        if availability.doctor_id.is_empty() {
            availability.doctor_id = doctor_id.to_string();
        }

        Ok(availability)
    }

    /// Resolve the bookable slots for one date
    pub async fn get_available_slots(
        &self,
        doctor_id: &str,
        date: &str,
        session: Option<&Session>,
    ) -> Result<Resolution> {
        // Reject bad input before touching the backend.
        let day = parse_calendar_date(date)?;

        let availability = self.get_doctor_availability(doctor_id, session).await?;
        let resolution = availability.resolve_day(day);

        debug!(
            "Doctor {} on {} ({}): {} slots from {:?}",
            doctor_id, day, resolution.weekday, resolution.slots.len(), resolution.source
        );
        Ok(resolution)
    }

    /// Replace the whole weekly pattern, keeping date overrides as they are
    pub async fn replace_weekly_availability(
        &self,
        doctor_id: &str,
        weekly: Vec<WeeklyAvailability>,
        session: &Session,
    ) -> Result<DoctorAvailability> {
        validate_weekly(&weekly)?;

        let mut availability = self.get_doctor_availability(doctor_id, Some(session)).await?;
        availability.weekly_availability = weekly;

        info!("Updating weekly availability for doctor {}", doctor_id);
        self.store(doctor_id, availability, session).await
    }

    /// Add an override for a date, or replace the existing one for that date
    pub async fn upsert_date_override(
        &self,
        doctor_id: &str,
        entry: SpecificDateOverride,
        session: &Session,
    ) -> Result<DoctorAvailability> {
        entry.validate()?;

        let mut availability = self.get_doctor_availability(doctor_id, Some(session)).await?;
        availability.specific_dates.retain(|existing| existing.date != entry.date);
        availability.specific_dates.push(entry);
        availability.specific_dates.sort_by_key(|o| o.date);

        self.store(doctor_id, availability, session).await
    }

    pub async fn remove_date_override(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        session: &Session,
    ) -> Result<DoctorAvailability> {
        let mut availability = self.get_doctor_availability(doctor_id, Some(session)).await?;

        let before = availability.specific_dates.len();
        availability.specific_dates.retain(|existing| existing.date != date);
        if availability.specific_dates.len() == before {
            return Err(AvailabilityError::OverrideNotFound(date.to_string()).into());
        }

        self.store(doctor_id, availability, session).await
    }

    /// Write the full configuration back under `doctor_id`, whatever id the
    /// backend echoed when it was read.
    async fn store(
        &self,
        doctor_id: &str,
        mut availability: DoctorAvailability,
        session: &Session,
    ) -> Result<DoctorAvailability> {
        availability.doctor_id = doctor_id.to_string();
        availability.validate()?;

        let stored: DoctorAvailability = self.backend.request(
            Method::PUT,
            &Self::availability_path(doctor_id),
            Some(session.token()),
            Some(serde_json::to_value(&availability)?),
        ).await?;

        Ok(stored)
    }
}
