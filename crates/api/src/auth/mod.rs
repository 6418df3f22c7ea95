//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token validation (and issuance for tooling/tests).

pub mod jwt;
