pub mod availability;
pub mod resolver;
pub mod selection;
pub mod slot_request;

pub use availability::AvailabilityService;
pub use resolver::{resolve, resolve_day, resolution_for, Resolution, ResolutionSource};
pub use selection::{BookingSelection, DateChoice, NOT_AVAILABLE_NOTICE};
pub use slot_request::SlotRequestService;
