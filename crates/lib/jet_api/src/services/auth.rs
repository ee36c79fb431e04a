//! Login and registration.

use std::sync::Arc;

use jet_core::auth::AuthError;
use jet_core::auth::jwt::{Identity, TokenService};
use jet_core::auth::password::verify_password;
use jet_core::models::user::User;
use jet_core::repo::UserRepository;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::models::{CreateUserRequest, LoginResponse};
use crate::services::users::new_user_from_request;

/// Token type reported to clients.
pub const TOKEN_TYPE: &str = "Bearer";

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }

    /// Authenticate with username + password and issue an access token.
    ///
    /// Unknown usernames fail with `UserNotFound`; a wrong password fails
    /// with `AuthFailed`.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(password, &user.password_hash) {
            warn!(username, "login rejected: wrong password");
            return Err(AuthError::AuthFailed.into());
        }

        let access_token = self.tokens.sign(&Identity {
            id: user.id,
            username: user.username.clone(),
        })?;
        info!(user_id = user.id, username = %user.username, "login succeeded");

        Ok(LoginResponse {
            userid: user.id,
            username: user.username,
            nick_name: user.nick_name,
            access_token,
            expires_in: self.tokens.ttl().num_seconds(),
            token_type: TOKEN_TYPE.to_string(),
        })
    }

    /// Create an account for an anonymous caller. The new user is its own
    /// creator.
    pub async fn register(&self, req: &CreateUserRequest) -> AppResult<User> {
        let new_user = new_user_from_request(req, req.username.trim())?;
        let user = self.repo.create(new_user).await?;
        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }
}
