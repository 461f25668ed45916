//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or an executor) as the first argument.

pub mod appointment_repo;
pub mod session_repo;
pub mod user_repo;

pub use appointment_repo::AppointmentRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
