pub mod appointments;
pub mod auth;
