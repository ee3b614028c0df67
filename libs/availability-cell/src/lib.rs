pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::AvailabilityError;
pub use models::{
    AvailabilitySlotRequest, ClockTime, DayOfWeek, DoctorAvailability, SlotRequestStatus,
    SpecificDateOverride, TimeSlot, WeeklyAvailability,
};
pub use router::{availability_routes, slot_request_routes};
pub use services::{
    resolve, resolve_day, AvailabilityService, BookingSelection, Resolution, SlotRequestService,
};
