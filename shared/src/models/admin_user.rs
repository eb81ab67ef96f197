//! Admin User Model

use serde::{Deserialize, Serialize};

/// Back-office user account
///
/// `role` is either `"admin"` or `"staff"`; the admin surface only checks
/// for the admin role, there is no finer-grained permission model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string, never serialized to clients
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl AdminUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}
