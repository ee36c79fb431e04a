//! User CRUD handlers.

use axum::Json;
use axum::extract::{Path, State};
use jet_core::models::user::User;

use crate::AppState;
use crate::error::{AppError, AppResult, MSG_INVALID_USER_ID};
use crate::handlers::AppJson;
use crate::middleware::auth::CurrentUser;
use crate::models::{CreateUserRequest, SeedResponse, UpdateUserRequest};
use crate::response::{ApiResponse, success};

/// Ids are positive integers.
fn parse_user_id(raw: &str) -> AppResult<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(AppError::BadRequest(MSG_INVALID_USER_ID.into())),
    }
}

/// `GET /api/v1/users`
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<User>>>> {
    let users = state.users.list().await?;
    Ok(success("", users))
}

/// `POST /api/v1/users`
pub async fn create_user(
    State(state): State<AppState>,
    caller: CurrentUser,
    AppJson(body): AppJson<CreateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = state.users.create(&body, &caller.username).await?;
    Ok(success("User created", user))
}

/// `GET /api/v1/users/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = state.users.get(parse_user_id(&id)?).await?;
    Ok(success("", user))
}

/// `PUT /api/v1/users/{id}`
pub async fn update_user(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<String>,
    AppJson(body): AppJson<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let id = parse_user_id(&id)?;
    let user = state
        .users
        .update_nick_name(id, &body.nick_name, &caller.username)
        .await?;
    Ok(success("User updated", user))
}

/// `DELETE /api/v1/users/{id}`
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.users.delete(parse_user_id(&id)?).await?;
    Ok(success("User deleted", ()))
}

/// `POST /api/v1/users/insert`: seed baseline users into an empty store.
pub async fn insert_initial_data(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<SeedResponse>>> {
    let outcome = state.users.seed_initial_data().await?;
    Ok(success("Initial data processed", outcome))
}
