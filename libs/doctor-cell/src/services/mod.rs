pub mod availability;
pub mod cache;
pub mod doctor;

pub use availability::AvailabilityService;
pub use cache::ReferenceCache;
pub use doctor::DoctorService;
