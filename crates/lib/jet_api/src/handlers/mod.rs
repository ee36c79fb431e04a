//! Request handlers.

pub mod auth;
pub mod health;
pub mod users;

use axum::extract::FromRequest;

use crate::error::{AppError, MSG_ROUTE_NOT_FOUND};

/// `Json` extractor whose rejection is the standard error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Fallback for unmatched paths.
pub async fn not_found() -> AppError {
    AppError::NotFound(MSG_ROUTE_NOT_FOUND.into())
}
