pub mod admin;
pub mod booking;
pub mod lifecycle;

pub use admin::AdminAppointmentService;
pub use booking::BookingService;
