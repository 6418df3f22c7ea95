//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod appointment_repo;
pub mod audit_repo;
pub mod dashboard_repo;
pub mod history_repo;
pub mod notification_repo;
pub mod service_repo;
pub mod stylist_repo;
pub mod user_repo;
pub mod waitlist_repo;

pub use appointment_repo::AppointmentRepo;
pub use audit_repo::AuditRepo;
pub use dashboard_repo::DashboardRepo;
pub use history_repo::HistoryRepo;
pub use notification_repo::NotificationRepo;
pub use service_repo::ServiceRepo;
pub use stylist_repo::StylistRepo;
pub use user_repo::UserRepo;
pub use waitlist_repo::WaitlistRepo;
