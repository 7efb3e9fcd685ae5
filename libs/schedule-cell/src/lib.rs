pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AvailabilityWindow, BookableSlot, ScheduleError, WindowService};
pub use services::availability::AvailabilityService;
pub use services::calendar::{is_past_date, parse_selected_date, today_local};
pub use services::discretizer::{derive_slots, service_duration_or_default};
