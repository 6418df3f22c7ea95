//! External delivery channels for customer notices.

pub mod email;
