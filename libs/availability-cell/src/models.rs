use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::AvailabilityError;

// ==============================================================================
// TIME OF DAY
// ==============================================================================

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Wall-clock time stored as minutes since midnight.
///
/// Accepts `"HH:MM"`, `"HH:MM:SS"` and `"hh:mm AM"` on input and always
/// renders as 24-hour `"HH:MM"`. Seconds are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, AvailabilityError> {
        if hour > 23 || minute > 59 {
            return Err(AvailabilityError::InvalidTime(format!("{}:{:02}", hour, minute)));
        }
        Ok(Self((hour * 60 + minute) as u16))
    }

    pub fn from_minutes(minutes: u16) -> Result<Self, AvailabilityError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(AvailabilityError::InvalidTime(format!("{} minutes", minutes)));
        }
        Ok(Self(minutes))
    }

    pub fn minutes_since_midnight(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0 / 60)
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0 % 60)
    }

    /// `"9:05 AM"` style rendering for display.
    pub fn to_12_hour_string(self) -> String {
        let (hour, meridiem) = match self.hour() {
            0 => (12, "AM"),
            h @ 1..=11 => (h, "AM"),
            12 => (12, "PM"),
            h => (h - 12, "PM"),
        };
        format!("{}:{:02} {}", hour, self.minute(), meridiem)
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }
}

impl FromStr for ClockTime {
    type Err = AvailabilityError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let upper = trimmed.to_ascii_uppercase();
        let invalid = || AvailabilityError::InvalidTime(input.to_string());

        let parsed = match upper.strip_suffix("AM").or_else(|| upper.strip_suffix("PM")) {
            Some(clock) => {
                let meridiem = &upper[upper.len() - 2..];
                let normalized = format!("{} {}", clock.trim_end(), meridiem);
                NaiveTime::parse_from_str(&normalized, "%I:%M %p")
            }
            None => NaiveTime::parse_from_str(trimmed, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S")),
        };

        parsed.map(Self::from).map_err(|_| invalid())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = AvailabilityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl TimeSlot {
    pub fn new(start_time: ClockTime, end_time: ClockTime) -> Self {
        Self { start_time, end_time }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, AvailabilityError> {
        Ok(Self::new(start.parse()?, end.parse()?))
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end_time
            .minutes_since_midnight()
            .saturating_sub(self.start_time.minutes_since_midnight())
    }

    pub fn validate(&self) -> Result<(), AvailabilityError> {
        if self.start_time >= self.end_time {
            return Err(AvailabilityError::InvalidTimeSlot {
                start: self.start_time.to_string(),
                end: self.end_time.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_time, self.end_time)
    }
}

// ==============================================================================
// CALENDAR DATES
// ==============================================================================

/// Reduces a date or timestamp string to its calendar day.
///
/// The day is taken as written: an offset on an RFC 3339 timestamp is not
/// applied before the time-of-day is dropped.
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate, AvailabilityError> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|timestamp| timestamp.date())
        .ok_or_else(|| AvailabilityError::InvalidDate(input.to_string()))
}

/// Serde adapter: reads any form `parse_calendar_date` accepts, writes `YYYY-MM-DD`.
pub mod calendar_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_calendar_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    /// Monday = 0 .. Sunday = 6.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        Self::ALL[weekday.num_days_from_monday() as usize]
    }
}

impl FromStr for DayOfWeek {
    type Err = AvailabilityError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let lower = input.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| day.as_str() == lower)
            .ok_or_else(|| AvailabilityError::InvalidWeekday(input.to_string()))
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// AVAILABILITY CONFIGURATION
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAvailability {
    pub day: DayOfWeek,
    pub is_available: bool,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificDateOverride {
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    pub is_available: bool,
}

impl SpecificDateOverride {
    pub fn validate(&self) -> Result<(), AvailabilityError> {
        self.time_slots.iter().try_for_each(TimeSlot::validate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorAvailability {
    pub doctor_id: String,
    #[serde(default)]
    pub weekly_availability: Vec<WeeklyAvailability>,
    #[serde(default)]
    pub specific_dates: Vec<SpecificDateOverride>,
}

impl DoctorAvailability {
    pub fn empty(doctor_id: impl Into<String>) -> Self {
        Self {
            doctor_id: doctor_id.into(),
            weekly_availability: Vec::new(),
            specific_dates: Vec::new(),
        }
    }

    /// Checks the rules the doctor-facing editing actions must keep.
    pub fn validate(&self) -> Result<(), AvailabilityError> {
        validate_weekly(&self.weekly_availability)?;

        let mut seen = HashSet::new();
        for entry in &self.specific_dates {
            if !seen.insert(entry.date) {
                return Err(AvailabilityError::DuplicateOverrideDate(entry.date.to_string()));
            }
            entry.validate()?;
        }
        Ok(())
    }
}

pub fn validate_weekly(weekly: &[WeeklyAvailability]) -> Result<(), AvailabilityError> {
    let mut seen = HashSet::new();
    for entry in weekly {
        if !seen.insert(entry.day) {
            return Err(AvailabilityError::DuplicateWeekday(entry.day.to_string()));
        }
        entry.time_slots.iter().try_for_each(TimeSlot::validate)?;
    }
    Ok(())
}

// ==============================================================================
// AVAILABILITY SLOT REQUESTS (doctor-submitted, admin-reviewed)
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotRequestStatus {
    Pending,
    Approved { notes: Option<String> },
    Rejected { notes: Option<String> },
}

impl SlotRequestStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            SlotRequestStatus::Pending => StatusKind::Pending,
            SlotRequestStatus::Approved { .. } => StatusKind::Approved,
            SlotRequestStatus::Rejected { .. } => StatusKind::Rejected,
        }
    }

    pub fn notes(&self) -> Option<&str> {
        match self {
            SlotRequestStatus::Pending => None,
            SlotRequestStatus::Approved { notes } | SlotRequestStatus::Rejected { notes } => {
                notes.as_deref()
            }
        }
    }
}

/// Status without payload, used for filtering and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Pending,
    Approved,
    Rejected,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusKind::Pending => "pending",
            StatusKind::Approved => "approved",
            StatusKind::Rejected => "rejected",
        }
    }
}

impl FromStr for StatusKind {
    type Err = AvailabilityError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "pending" => Ok(StatusKind::Pending),
            "approved" => Ok(StatusKind::Approved),
            "rejected" => Ok(StatusKind::Rejected),
            other => Err(AvailabilityError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SlotRequestRecord", into = "SlotRequestRecord")]
pub struct AvailabilitySlotRequest {
    pub id: String,
    pub doctor_id: String,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub status: SlotRequestStatus,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl AvailabilitySlotRequest {
    pub fn is_pending(&self) -> bool {
        self.status == SlotRequestStatus::Pending
    }

    pub fn approve(&mut self, notes: Option<String>, at: DateTime<Utc>) -> Result<(), AvailabilityError> {
        self.review(SlotRequestStatus::Approved { notes }, at)
    }

    pub fn reject(&mut self, notes: Option<String>, at: DateTime<Utc>) -> Result<(), AvailabilityError> {
        self.review(SlotRequestStatus::Rejected { notes }, at)
    }

    fn review(&mut self, outcome: SlotRequestStatus, at: DateTime<Utc>) -> Result<(), AvailabilityError> {
        if !self.is_pending() {
            return Err(AvailabilityError::AlreadyReviewed(self.status.kind().to_string()));
        }
        self.status = outcome;
        self.reviewed_at = Some(at);
        Ok(())
    }

    pub fn ensure_withdrawable_by(&self, doctor_id: &str) -> Result<(), AvailabilityError> {
        if self.doctor_id != doctor_id {
            return Err(AvailabilityError::NotOwner);
        }
        if !self.is_pending() {
            return Err(AvailabilityError::NotPending(self.status.kind().to_string()));
        }
        Ok(())
    }
}

/// Backend representation: flat status string plus optional admin notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequestRecord {
    pub id: String,
    pub doctor_id: String,
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub status: String,
    #[serde(default)]
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl TryFrom<SlotRequestRecord> for AvailabilitySlotRequest {
    type Error = AvailabilityError;

    fn try_from(record: SlotRequestRecord) -> Result<Self, Self::Error> {
        let status = match record.status.parse::<StatusKind>()? {
            StatusKind::Pending => SlotRequestStatus::Pending,
            StatusKind::Approved => SlotRequestStatus::Approved { notes: record.admin_notes },
            StatusKind::Rejected => SlotRequestStatus::Rejected { notes: record.admin_notes },
        };

        Ok(Self {
            id: record.id,
            doctor_id: record.doctor_id,
            date: record.date,
            slot: TimeSlot::new(record.start_time, record.end_time),
            status,
            created_at: record.created_at,
            reviewed_at: record.reviewed_at,
        })
    }
}

impl From<AvailabilitySlotRequest> for SlotRequestRecord {
    fn from(request: AvailabilitySlotRequest) -> Self {
        let admin_notes = request.status.notes().map(str::to_string);
        Self {
            id: request.id,
            doctor_id: request.doctor_id,
            date: request.date,
            start_time: request.slot.start_time,
            end_time: request.slot.end_time,
            status: request.status.kind().to_string(),
            admin_notes,
            created_at: request.created_at,
            reviewed_at: request.reviewed_at,
        }
    }
}

// ==============================================================================
// REQUEST DTOs
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlotRequest {
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl CreateSlotRequest {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.start_time, self.end_time)
    }

    pub fn validate(&self, today: NaiveDate) -> Result<(), AvailabilityError> {
        self.slot().validate()?;
        if self.date < today {
            return Err(AvailabilityError::DateInPast(self.date.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewSlotRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Default)]
pub struct SlotRequestFilter {
    pub doctor_id: Option<String>,
    pub status: Option<StatusKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWeeklyAvailabilityRequest {
    pub weekly_availability: Vec<WeeklyAvailability>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clock_time_accepts_both_formats() {
        let nine: ClockTime = "09:00".parse().unwrap();
        assert_eq!(nine.minutes_since_midnight(), 540);
        assert_eq!("9:00 AM".parse::<ClockTime>().unwrap(), nine);
        assert_eq!("09:00am".parse::<ClockTime>().unwrap(), nine);
        assert_eq!("09:00:00".parse::<ClockTime>().unwrap(), nine);

        assert_eq!("12:00 AM".parse::<ClockTime>().unwrap().minutes_since_midnight(), 0);
        assert_eq!("12:30 PM".parse::<ClockTime>().unwrap().to_string(), "12:30");
        assert_eq!("05:15 PM".parse::<ClockTime>().unwrap().to_string(), "17:15");
    }

    #[test]
    fn test_clock_time_rejects_garbage() {
        for input in ["", "24:00", "25:00", "9", "13:00 PM", "noon", "09:60"] {
            assert!(input.parse::<ClockTime>().is_err(), "accepted {:?}", input);
        }
        assert!(ClockTime::from_minutes(1440).is_err());
        assert!(ClockTime::new(24, 0).is_err());
    }

    #[test]
    fn test_clock_time_display_forms() {
        let time = ClockTime::new(0, 5).unwrap();
        assert_eq!(time.to_string(), "00:05");
        assert_eq!(time.to_12_hour_string(), "12:05 AM");
        assert_eq!(ClockTime::new(13, 0).unwrap().to_12_hour_string(), "1:00 PM");
    }

    #[test]
    fn test_parse_calendar_date_strips_time() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        for input in [
            "2025-03-10",
            " 2025-03-10 ",
            "2025-03-10T00:00:00.000Z",
            "2025-03-10T23:30:00+05:00",
            "2025-03-10T18:45:12",
            "2025-03-10 08:00:00",
            "2025-03-10T08:00",
        ] {
            assert_eq!(parse_calendar_date(input).unwrap(), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_parse_calendar_date_rejects_malformed() {
        for input in ["", "tomorrow", "2025-13-01", "2025-02-30", "10/03/2025"] {
            assert!(matches!(
                parse_calendar_date(input),
                Err(AvailabilityError::InvalidDate(_))
            ));
        }
    }

    #[test]
    fn test_day_of_week_is_locale_independent() {
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(DayOfWeek::of(monday), DayOfWeek::Monday);
        assert_eq!(DayOfWeek::of(monday).index(), 0);
        assert_eq!(DayOfWeek::of(monday + chrono::Duration::days(6)).index(), 6);
        assert_eq!("Sunday".parse::<DayOfWeek>().unwrap(), DayOfWeek::Sunday);
        assert_eq!(
            "someday".parse::<DayOfWeek>(),
            Err(AvailabilityError::InvalidWeekday("someday".to_string()))
        );
    }

    #[test]
    fn test_doctor_availability_defaults_missing_arrays() {
        let parsed: DoctorAvailability = serde_json::from_value(json!({ "doctorId": "d1" })).unwrap();
        assert!(parsed.weekly_availability.is_empty());
        assert!(parsed.specific_dates.is_empty());
    }

    #[test]
    fn test_override_date_normalized_on_decode() {
        let parsed: SpecificDateOverride = serde_json::from_value(json!({
            "date": "2025-03-10T00:00:00.000Z",
            "isAvailable": true,
            "timeSlots": [{ "startTime": "10:00 AM", "endTime": "11:00 AM" }]
        }))
        .unwrap();

        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(
            serde_json::to_value(&parsed).unwrap(),
            json!({
                "date": "2025-03-10",
                "isAvailable": true,
                "timeSlots": [{ "startTime": "10:00", "endTime": "11:00" }]
            })
        );
    }

    #[test]
    fn test_validate_rejects_duplicates_and_inverted_slots() {
        let mut availability = DoctorAvailability::empty("d1");
        let monday = WeeklyAvailability {
            day: DayOfWeek::Monday,
            is_available: true,
            time_slots: vec![TimeSlot::parse("09:00", "12:00").unwrap()],
        };
        availability.weekly_availability = vec![monday.clone(), monday];
        assert!(matches!(
            availability.validate(),
            Err(AvailabilityError::DuplicateWeekday(_))
        ));

        availability.weekly_availability.truncate(1);
        availability.weekly_availability[0].time_slots = vec![TimeSlot::parse("12:00", "09:00").unwrap()];
        assert!(matches!(
            availability.validate(),
            Err(AvailabilityError::InvalidTimeSlot { .. })
        ));
    }

    #[test]
    fn test_slot_request_wire_format() {
        let record = json!({
            "id": "r1",
            "doctorId": "d1",
            "date": "2030-01-07",
            "startTime": "10:00",
            "endTime": "11:00",
            "status": "rejected",
            "adminNotes": "Clinic closed",
            "createdAt": "2029-12-20T08:00:00Z"
        });

        let request: AvailabilitySlotRequest = serde_json::from_value(record).unwrap();
        assert_eq!(
            request.status,
            SlotRequestStatus::Rejected { notes: Some("Clinic closed".to_string()) }
        );
        assert_eq!(request.reviewed_at, None);

        let back = serde_json::to_value(&request).unwrap();
        assert_eq!(back["status"], "rejected");
        assert_eq!(back["adminNotes"], "Clinic closed");
    }

    #[test]
    fn test_slot_request_unknown_status_fails_decode() {
        let record = json!({
            "id": "r1",
            "doctorId": "d1",
            "date": "2030-01-07",
            "startTime": "10:00",
            "endTime": "11:00",
            "status": "maybe",
            "createdAt": "2029-12-20T08:00:00Z"
        });
        assert!(serde_json::from_value::<AvailabilitySlotRequest>(record).is_err());
    }
}
