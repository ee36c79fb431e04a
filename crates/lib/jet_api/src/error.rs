//! Application error types.
//!
//! Handlers return [`AppError`]; its `IntoResponse` picks the HTTP status,
//! logs any internal detail and writes a generic envelope. Store and library
//! error text never reaches the response body.

use axum::extract::rejection::JsonRejection;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jet_core::auth::AuthError;
use jet_core::repo::RepoError;
use thiserror::Error;
use tracing::{error, warn};

use crate::response::ApiResponse;

pub const MSG_INVALID_PARAMS: &str = "Invalid request parameters";
pub const MSG_INVALID_USER_ID: &str = "Invalid user ID";
pub const MSG_USER_NOT_FOUND: &str = "User not found";
pub const MSG_ROUTE_NOT_FOUND: &str = "Resource not found";
pub const MSG_AUTH_FAILED: &str = "Authentication failed";
pub const MSG_TOKEN_MISSING: &str = "Token missing";
pub const MSG_TOKEN_INVALID: &str = "Invalid token";
pub const MSG_TOKEN_EXPIRED: &str = "Token expired";
pub const MSG_UNAVAILABLE: &str = "Service unavailable";
pub const MSG_INTERNAL: &str = "Internal server error";

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Authentication failed")]
    AuthFailed,

    #[error("Token missing")]
    TokenMissing,

    #[error("Token invalid")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::AuthFailed => StatusCode::UNAUTHORIZED,
            AppError::TokenMissing | AppError::TokenInvalid | AppError::TokenExpired => {
                StatusCode::FORBIDDEN
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the caller.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::BadRequest(m) | AppError::NotFound(m) | AppError::Conflict(m) => m,
            AppError::AuthFailed => MSG_AUTH_FAILED,
            AppError::TokenMissing => MSG_TOKEN_MISSING,
            AppError::TokenInvalid => MSG_TOKEN_INVALID,
            AppError::TokenExpired => MSG_TOKEN_EXPIRED,
            AppError::Unavailable(_) => MSG_UNAVAILABLE,
            AppError::Internal(_) => MSG_INTERNAL,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        let body = Json(ApiResponse::error(status.as_u16(), self.public_message()));
        (status, body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::TokenMissing => AppError::TokenMissing,
            AuthError::TokenInvalid => AppError::TokenInvalid,
            AuthError::TokenExpired => AppError::TokenExpired,
            AuthError::AuthFailed => AppError::AuthFailed,
            AuthError::UserNotFound => AppError::NotFound(MSG_USER_NOT_FOUND.into()),
            AuthError::Signing(msg) | AuthError::Hashing(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict(msg) => AppError::Conflict(msg),
            RepoError::Unavailable(msg) => AppError::Unavailable(msg),
            RepoError::Db(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        warn!(error = %e, "rejected request body");
        AppError::BadRequest(MSG_INVALID_PARAMS.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn token_errors_are_forbidden() {
        for e in [
            AuthError::TokenMissing,
            AuthError::TokenInvalid,
            AuthError::TokenExpired,
        ] {
            assert_eq!(StatusCode::FORBIDDEN, AppError::from(e).status());
        }
    }

    #[test]
    fn credential_errors_map_to_401_and_404() {
        assert_eq!(
            StatusCode::UNAUTHORIZED,
            AppError::from(AuthError::AuthFailed).status()
        );
        assert_eq!(
            StatusCode::NOT_FOUND,
            AppError::from(AuthError::UserNotFound).status()
        );
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let resp = AppError::Internal("relation \"users\" does not exist".into()).into_response();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, resp.status());
        let json = body_json(resp).await;
        assert_eq!(500, json["code"]);
        assert_eq!(MSG_INTERNAL, json["message"]);
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn unavailable_store_detail_is_not_leaked() {
        let resp = AppError::from(RepoError::Unavailable("10.0.0.5:5432 refused".into()))
            .into_response();
        assert_eq!(StatusCode::SERVICE_UNAVAILABLE, resp.status());
        let json = body_json(resp).await;
        assert_eq!(MSG_UNAVAILABLE, json["message"]);
    }

    #[tokio::test]
    async fn envelope_code_matches_status() {
        let resp = AppError::TokenExpired.into_response();
        assert_eq!(StatusCode::FORBIDDEN, resp.status());
        let json = body_json(resp).await;
        assert_eq!(403, json["code"]);
        assert_eq!(MSG_TOKEN_EXPIRED, json["message"]);
    }
}
