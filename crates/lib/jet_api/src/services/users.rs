//! User management service.

use std::sync::Arc;

use jet_core::auth::password::hash_password;
use jet_core::models::user::{NewUser, User};
use jet_core::repo::UserRepository;
use jet_core::seed::{SeedError, SeedOutcome, SeedUser, seed_baseline};
use tracing::{error, info};

use crate::error::{AppError, AppResult, MSG_INVALID_PARAMS, MSG_USER_NOT_FOUND};
use crate::models::{CreateUserRequest, SeedResponse};

/// Validate a create/register body and hash its password.
pub(crate) fn new_user_from_request(
    req: &CreateUserRequest,
    created_by: &str,
) -> AppResult<NewUser> {
    let required = [&req.username, &req.nick_name, &req.password, &req.email];
    if required.iter().any(|v| v.trim().is_empty()) {
        return Err(AppError::BadRequest(MSG_INVALID_PARAMS.into()));
    }
    Ok(NewUser {
        username: req.username.trim().to_string(),
        nick_name: req.nick_name.trim().to_string(),
        password_hash: hash_password(&req.password)?,
        email: req.email.trim().to_string(),
        created_by: created_by.to_string(),
    })
}

/// CRUD over users plus on-demand baseline seeding.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    seed_users: Arc<Vec<SeedUser>>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, seed_users: Vec<SeedUser>) -> Self {
        Self {
            repo,
            seed_users: Arc::new(seed_users),
        }
    }

    pub async fn create(&self, req: &CreateUserRequest, actor: &str) -> AppResult<User> {
        let user = new_user_from_request(req, actor)?;
        let created = self.repo.create(user).await.inspect_err(|e| {
            error!(username = %req.username, error = %e, "failed to create user");
        })?;
        info!(id = created.id, username = %created.username, actor, "user created");
        Ok(created)
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.repo.list().await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(MSG_USER_NOT_FOUND.into()))
    }

    pub async fn update_nick_name(&self, id: i64, nick_name: &str, actor: &str) -> AppResult<User> {
        let nick_name = nick_name.trim();
        if nick_name.is_empty() {
            return Err(AppError::BadRequest(MSG_INVALID_PARAMS.into()));
        }
        let updated = self
            .repo
            .update_nick_name(id, nick_name, actor)
            .await?
            .ok_or_else(|| AppError::NotFound(MSG_USER_NOT_FOUND.into()))?;
        info!(id, nick_name, actor, "user updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound(MSG_USER_NOT_FOUND.into()));
        }
        info!(id, "user deleted");
        Ok(())
    }

    /// Insert the configured seed users if the store is empty.
    pub async fn seed_initial_data(&self) -> AppResult<SeedResponse> {
        let outcome = seed_baseline(self.repo.as_ref(), &self.seed_users)
            .await
            .map_err(|e| match e {
                SeedError::Repo(e) => AppError::from(e),
                SeedError::Auth(e) => AppError::from(e),
            })?;
        Ok(match outcome {
            SeedOutcome::Skipped { .. } => SeedResponse {
                inserted: 0,
                skipped: true,
            },
            SeedOutcome::Inserted { count } => SeedResponse {
                inserted: count,
                skipped: false,
            },
        })
    }
}
