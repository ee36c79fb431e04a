//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use jet_core::models::user::User;

use crate::AppState;
use crate::error::AppResult;
use crate::handlers::AppJson;
use crate::middleware::auth::CurrentUser;
use crate::models::{CreateUserRequest, LoginRequest, LoginResponse, ProfileResponse};
use crate::response::{ApiResponse, success};

/// `POST /api/v1/login`: authenticate with username + password.
pub async fn login_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = state.auth.login(&body.username, &body.password).await?;
    Ok(success("Login successful", resp))
}

/// `POST /api/v1/register`: create a new user account.
pub async fn register_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = state.auth.register(&body).await?;
    Ok(success("Registration successful", user))
}

/// `GET /api/v1/profile`: identity carried by the request's token.
pub async fn profile_handler(user: CurrentUser) -> Json<ApiResponse<ProfileResponse>> {
    success(
        "",
        ProfileResponse {
            id: user.id,
            username: user.username,
        },
    )
}
