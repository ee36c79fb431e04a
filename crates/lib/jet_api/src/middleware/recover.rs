//! Top-level panic boundary.

use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Turns a handler panic into the generic 500 envelope. The panic payload is
/// logged, never returned.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}
