pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{BookingError, BookingRecord, FlowEffect, FlowSnapshot, FlowState, Notice};
pub use services::flow::BookingFlow;
pub use services::session::BookingFlowService;
