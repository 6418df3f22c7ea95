//! Database row structs and DTOs.
//!
//! Row structs derive `FromRow` and convert into the `salon-core` domain
//! types; status columns are stored as TEXT and parsed on the way out.

pub mod appointment;
pub mod dashboard;
pub mod notification;
pub mod service;
pub mod stylist;
pub mod user;
pub mod waitlist;
