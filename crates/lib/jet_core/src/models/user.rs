//! User domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored user record. The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub nick_name: String,
    #[serde(skip)]
    pub password_hash: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// Fields needed to insert a user. `password_hash` must already be hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub nick_name: String,
    pub password_hash: String,
    pub email: String,
    /// Username of the actor creating the record, or `"system"`.
    pub created_by: String,
}
