pub mod account;
pub mod appointment;
pub mod doctor;
pub mod error;
pub mod request;
pub mod schedule;
pub mod session;
pub mod time;

pub use account::{AccountView, PatientAccount, Sex};
pub use appointment::{Appointment, AppointmentStatus, AppointmentView};
pub use doctor::{DoctorAccount, DoctorView};
pub use error::AppError;
pub use schedule::{ScheduleSlot, ScheduleView};
pub use session::Session;
pub use request::Validate;
