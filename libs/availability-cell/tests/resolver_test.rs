// libs/availability-cell/tests/resolver_test.rs

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate};

use availability_cell::models::{
    DayOfWeek, DoctorAvailability, SpecificDateOverride, TimeSlot, WeeklyAvailability,
};
use availability_cell::services::{resolve, resolve_day, resolution_for, ResolutionSource};
use availability_cell::AvailabilityError;

fn slot(start: &str, end: &str) -> TimeSlot {
    TimeSlot::parse(start, end).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn weekly(day: DayOfWeek, is_available: bool, time_slots: Vec<TimeSlot>) -> WeeklyAvailability {
    WeeklyAvailability { day, is_available, time_slots }
}

fn override_for(day: &str, is_available: bool, time_slots: Vec<TimeSlot>) -> SpecificDateOverride {
    SpecificDateOverride { date: date(day), time_slots, is_available }
}

/// Monday/Wednesday mornings, Sunday explicitly off.
fn standard_week() -> Vec<WeeklyAvailability> {
    vec![
        weekly(DayOfWeek::Monday, true, vec![slot("09:00", "12:00")]),
        weekly(DayOfWeek::Wednesday, true, vec![slot("09:00", "10:00"), slot("10:30", "12:00")]),
        weekly(DayOfWeek::Sunday, false, vec![slot("10:00", "11:00")]),
    ]
}

const MONDAY: &str = "2030-01-07";
const SUNDAY: &str = "2030-01-13";

#[test]
fn test_weekly_monday_available() {
    let slots = resolve(MONDAY, &standard_week(), &[]).unwrap();
    assert_eq!(slots, vec![slot("09:00", "12:00")]);
}

#[test]
fn test_unavailable_override_closes_available_weekday() {
    let overrides = vec![override_for(MONDAY, false, vec![slot("09:00", "12:00")])];

    assert!(resolve(MONDAY, &standard_week(), &overrides).unwrap().is_empty());

    let resolution = resolution_for(date(MONDAY), &standard_week(), &overrides);
    assert_eq!(resolution.source, ResolutionSource::Override);
    assert!(!resolution.is_available());
}

#[test]
fn test_unavailable_weekday_without_override_is_empty() {
    assert!(resolve(SUNDAY, &standard_week(), &[]).unwrap().is_empty());
}

#[test]
fn test_available_override_opens_unavailable_sunday() {
    let overrides = vec![override_for(SUNDAY, true, vec![slot("10:00", "11:00")])];
    let slots = resolve(SUNDAY, &standard_week(), &overrides).unwrap();
    assert_eq!(slots, vec![slot("10:00", "11:00")]);
}

#[test]
fn test_available_override_replaces_weekly_slots_verbatim() {
    // Overlapping and unordered slots are returned exactly as configured.
    let custom = vec![slot("15:00", "16:00"), slot("08:00", "09:30"), slot("09:00", "10:00")];
    let overrides = vec![override_for(MONDAY, true, custom.clone())];

    assert_eq!(resolve(MONDAY, &standard_week(), &overrides).unwrap(), custom);
}

#[test]
fn test_override_only_applies_to_its_own_date() {
    let overrides = vec![override_for(MONDAY, false, vec![])];
    let next_monday = (date(MONDAY) + Duration::days(7)).format("%Y-%m-%d").to_string();

    assert_eq!(
        resolve(&next_monday, &standard_week(), &overrides).unwrap(),
        vec![slot("09:00", "12:00")]
    );
}

#[test]
fn test_day_without_any_configuration_is_empty() {
    // 2030-01-08 is a Tuesday, which the standard week does not mention.
    let resolution = resolution_for(date("2030-01-08"), &standard_week(), &[]);
    assert_eq!(resolution.source, ResolutionSource::NoSchedule);
    assert_eq!(resolution.weekday, DayOfWeek::Tuesday);
    assert!(resolution.slots.is_empty());

    assert!(resolve(MONDAY, &[], &[]).unwrap().is_empty());
}

#[test]
fn test_time_of_day_is_stripped_from_requested_date() {
    let expected = vec![slot("09:00", "12:00")];
    for input in ["2030-01-07T00:00:00.000Z", "2030-01-07T23:59:59", "2030-01-07T18:00:00-08:00"] {
        assert_eq!(resolve(input, &standard_week(), &[]).unwrap(), expected, "input {}", input);
    }
}

#[test]
fn test_malformed_date_is_an_error() {
    assert_matches!(
        resolve("next monday", &standard_week(), &[]),
        Err(AvailabilityError::InvalidDate(_))
    );
    assert_matches!(resolve("", &[], &[]), Err(AvailabilityError::InvalidDate(_)));
}

#[test]
fn test_resolve_is_idempotent() {
    let overrides = vec![override_for(SUNDAY, true, vec![slot("10:00", "11:00")])];
    let week = standard_week();

    for offset in 0..14 {
        let day = date(MONDAY) + Duration::days(offset);
        assert_eq!(resolve_day(day, &week, &overrides), resolve_day(day, &week, &overrides));
    }
}

#[test]
fn test_weekly_pattern_holds_for_every_day_of_a_fortnight() {
    let week = standard_week();
    let start = date(MONDAY);

    for offset in 0..14 {
        let day = start + Duration::days(offset);
        let expected = week
            .iter()
            .find(|w| w.day == DayOfWeek::of(day))
            .filter(|w| w.is_available)
            .map(|w| w.time_slots.clone())
            .unwrap_or_default();

        assert_eq!(resolve_day(day, &week, &[]), expected, "day {}", day);
    }
}

#[test]
fn test_doctor_availability_resolves_from_json() {
    let availability: DoctorAvailability = serde_json::from_value(serde_json::json!({
        "doctorId": "doctor-1",
        "weeklyAvailability": [
            { "day": "monday", "isAvailable": true,
              "timeSlots": [{ "startTime": "09:00 AM", "endTime": "12:00 PM" }] }
        ],
        "specificDates": [
            { "date": "2030-01-14T00:00:00.000Z", "isAvailable": false, "timeSlots": [] }
        ]
    }))
    .unwrap();

    let this_monday = availability.resolve(MONDAY).unwrap();
    assert_eq!(this_monday.source, ResolutionSource::Weekly);
    assert_eq!(this_monday.slots, vec![slot("09:00", "12:00")]);

    let next_monday = availability.resolve("2030-01-14").unwrap();
    assert_eq!(next_monday.source, ResolutionSource::Override);
    assert!(next_monday.slots.is_empty());
}
