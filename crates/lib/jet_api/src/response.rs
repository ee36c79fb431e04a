//! Uniform JSON response envelope.
//!
//! Every response body is `{ "code", "message", "data" }`. Successful
//! responses carry `code: 200`; errors carry their HTTP status and
//! `data: null` (see [`crate::error::AppError`]).

use axum::Json;
use serde::Serialize;

/// Default message for successful responses.
pub const MSG_OK: &str = "ok";

/// Response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl ApiResponse<()> {
    /// Envelope with no payload.
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// 200 envelope around `data`. An empty message becomes [`MSG_OK`].
pub fn success<T: Serialize>(message: &str, data: T) -> Json<ApiResponse<T>> {
    let message = if message.is_empty() { MSG_OK } else { message };
    Json(ApiResponse {
        code: 200,
        message: message.to_string(),
        data: Some(data),
    })
}
