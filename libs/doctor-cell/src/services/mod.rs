pub mod doctor;
pub mod scheduling;

pub use doctor::DoctorService;
pub use scheduling::SchedulingService;
