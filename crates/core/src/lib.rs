//! Domain logic for the appointment booking system.
//!
//! This crate has zero internal deps so it can be used by both the
//! API/repository layer and any future worker or CLI tooling.

pub mod appointment;
pub mod error;
pub mod scheduling;
pub mod types;
