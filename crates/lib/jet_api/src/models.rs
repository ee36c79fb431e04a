//! Request and response bodies.

use serde::{Deserialize, Serialize};

/// `POST /api/v1/login` body.
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Token issued on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub userid: i64,
    pub username: String,
    pub nick_name: String,
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub token_type: String,
}

/// Body of `POST /api/v1/register` and `POST /api/v1/users`.
#[derive(Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub nick_name: String,
    pub password: String,
    pub email: String,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("username", &self.username)
            .field("nick_name", &self.nick_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// `PUT /api/v1/users/{id}` body.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub nick_name: String,
}

/// Identity attached to the current request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
}

/// Result of `POST /api/v1/users/insert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedResponse {
    pub inserted: usize,
    pub skipped: bool,
}

/// `GET /health` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub database: DbStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
