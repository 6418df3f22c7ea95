//! Role name constants carried in access-token claims.

/// Salon staff with access to the admin dashboard and status changes.
pub const ROLE_ADMIN: &str = "admin";

/// Regular customer account.
pub const ROLE_USER: &str = "user";
