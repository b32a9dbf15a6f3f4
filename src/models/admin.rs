use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Explicit admin role. Only one role exists today, but keeping it as data
/// avoids the implicit "any logged-in user is an admin" assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AdminRole {
    Superadmin,
}

#[derive(Debug, Clone, FromRow)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: AdminRole,
}
