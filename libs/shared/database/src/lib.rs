pub mod accounts;
pub mod appointments;
pub mod doctors;
pub mod error;
pub mod ids;
pub mod schedules;
pub mod schema;
pub mod store;
pub mod transactions;

pub use error::DatabaseError;
pub use rusqlite::{Connection, Transaction};
pub use store::Database;
pub use transactions::StatusChange;
