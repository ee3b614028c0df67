use chrono::NaiveDate;
use tracing::debug;

use crate::error::AvailabilityError;
use crate::models::{parse_calendar_date, DoctorAvailability, TimeSlot};
use crate::services::resolver::Resolution;

pub const NOT_AVAILABLE_NOTICE: &str = "Doctor is not available on this date";

/// Outcome of picking a date in the booking form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateChoice {
    pub resolution: Resolution,
    pub notice: Option<&'static str>,
}

impl DateChoice {
    pub fn not_available(&self) -> bool {
        self.notice.is_some()
    }
}

/// Booking form state: the chosen date, the slots it offers and the picked slot.
///
/// A selected slot is only ever valid for the date it was offered on, so every
/// date change drops it.
#[derive(Debug, Clone, Default)]
pub struct BookingSelection {
    date: Option<NaiveDate>,
    offered: Vec<TimeSlot>,
    selected: Option<TimeSlot>,
}

impl BookingSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and applies a user-typed date. On a malformed date the current
    /// state is left as it was.
    pub fn choose_date(
        &mut self,
        input: &str,
        availability: &DoctorAvailability,
    ) -> Result<DateChoice, AvailabilityError> {
        let day = parse_calendar_date(input)?;
        Ok(self.choose_day(day, availability))
    }

    pub fn choose_day(&mut self, day: NaiveDate, availability: &DoctorAvailability) -> DateChoice {
        let resolution = availability.resolve_day(day);
        debug!(
            "Doctor {} offers {} slots on {}",
            availability.doctor_id,
            resolution.slots.len(),
            day
        );

        self.date = Some(day);
        self.offered = resolution.slots.clone();
        self.selected = None;

        let notice = (!resolution.is_available()).then_some(NOT_AVAILABLE_NOTICE);
        DateChoice { resolution, notice }
    }

    pub fn select_slot(&mut self, slot: TimeSlot) -> Result<(), AvailabilityError> {
        if self.date.is_none() {
            return Err(AvailabilityError::NoDateSelected);
        }
        if !self.offered.contains(&slot) {
            return Err(AvailabilityError::SlotNotOffered(slot.to_string()));
        }
        self.selected = Some(slot);
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn offered_slots(&self) -> &[TimeSlot] {
        &self.offered
    }

    pub fn selected(&self) -> Option<TimeSlot> {
        self.selected
    }
}
