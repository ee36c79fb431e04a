//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{DbStatus, HealthStatus};
use crate::response::{ApiResponse, success};

/// `GET /health`: verifies the store answers.
pub async fn health_check(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<HealthStatus>>> {
    state
        .store
        .ping()
        .await
        .map_err(|e| AppError::Unavailable(format!("store ping failed: {e}")))?;

    Ok(success(
        "",
        HealthStatus {
            status: "healthy".into(),
            timestamp: Utc::now().to_rfc3339(),
            version: state.config.app.version.clone(),
            database: DbStatus {
                status: "healthy".into(),
                message: None,
            },
        },
    ))
}
