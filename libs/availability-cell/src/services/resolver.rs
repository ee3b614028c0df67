use chrono::NaiveDate;
use serde::Serialize;

use crate::error::AvailabilityError;
use crate::models::{
    parse_calendar_date, DayOfWeek, DoctorAvailability, SpecificDateOverride, TimeSlot,
    WeeklyAvailability,
};

/// Which part of the configuration decided the outcome for a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Override,
    Weekly,
    NoSchedule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub date: NaiveDate,
    pub weekday: DayOfWeek,
    pub source: ResolutionSource,
    pub slots: Vec<TimeSlot>,
}

impl Resolution {
    pub fn is_available(&self) -> bool {
        !self.slots.is_empty()
    }
}

/// Bookable slots for `date`, which may be a plain date or a full timestamp.
pub fn resolve(
    date: &str,
    weekly: &[WeeklyAvailability],
    specific: &[SpecificDateOverride],
) -> Result<Vec<TimeSlot>, AvailabilityError> {
    let day = parse_calendar_date(date)?;
    Ok(resolve_day(day, weekly, specific))
}

pub fn resolve_day(
    day: NaiveDate,
    weekly: &[WeeklyAvailability],
    specific: &[SpecificDateOverride],
) -> Vec<TimeSlot> {
    resolution_for(day, weekly, specific).slots
}

pub fn resolution_for(
    day: NaiveDate,
    weekly: &[WeeklyAvailability],
    specific: &[SpecificDateOverride],
) -> Resolution {
    let weekday = DayOfWeek::of(day);

    // An override for the exact date wins even when it closes the day.
    let (source, slots) = if let Some(entry) = specific.iter().find(|o| o.date == day) {
        (ResolutionSource::Override, open_slots(entry.is_available, &entry.time_slots))
    } else if let Some(entry) = weekly.iter().find(|w| w.day == weekday) {
        (ResolutionSource::Weekly, open_slots(entry.is_available, &entry.time_slots))
    } else {
        (ResolutionSource::NoSchedule, Vec::new())
    };

    Resolution { date: day, weekday, source, slots }
}

fn open_slots(is_available: bool, slots: &[TimeSlot]) -> Vec<TimeSlot> {
    if is_available {
        slots.to_vec()
    } else {
        Vec::new()
    }
}

impl DoctorAvailability {
    pub fn resolve(&self, date: &str) -> Result<Resolution, AvailabilityError> {
        let day = parse_calendar_date(date)?;
        Ok(self.resolve_day(day))
    }

    pub fn resolve_day(&self, day: NaiveDate) -> Resolution {
        resolution_for(day, &self.weekly_availability, &self.specific_dates)
    }
}
