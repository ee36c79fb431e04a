//! Baseline data seeding.
//!
//! Seeds run only against an empty `users` table; any existing row skips the
//! whole batch so repeated boots never duplicate seed rows.

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::auth::AuthError;
use crate::auth::password::hash_password;
use crate::models::user::NewUser;
use crate::repo::{RepoError, UserRepository};

/// Actor recorded in `created_by` for seeded rows.
pub const SEED_ACTOR: &str = "system";

/// A user to create on first boot. The password is plaintext here and hashed
/// before insert.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct SeedUser {
    pub username: String,
    pub nick_name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedUser")
            .field("username", &self.username)
            .field("nick_name", &self.nick_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Seed set used when the configuration names none.
pub fn default_seed_users() -> Vec<SeedUser> {
    vec![SeedUser {
        username: "admin".into(),
        nick_name: "Administrator".into(),
        email: "admin@example.com".into(),
        password: "admin123".into(),
    }]
}

/// Seeding errors.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed lookup failed: {0}")]
    Repo(#[from] RepoError),

    #[error("seed password hashing failed: {0}")]
    Auth(#[from] AuthError),
}

/// What a seeding run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The table already held this many rows.
    Skipped { existing: i64 },
    Inserted { count: usize },
}

/// Insert `users` if and only if the store holds no users yet.
pub async fn seed_baseline(
    repo: &dyn UserRepository,
    users: &[SeedUser],
) -> Result<SeedOutcome, SeedError> {
    let existing = repo.count().await?;
    if existing > 0 {
        info!(existing, "baseline data already present, skipping seed");
        return Ok(SeedOutcome::Skipped { existing });
    }

    let rows = users
        .iter()
        .map(|u| {
            Ok(NewUser {
                username: u.username.clone(),
                nick_name: u.nick_name.clone(),
                password_hash: hash_password(&u.password)?,
                email: u.email.clone(),
                created_by: SEED_ACTOR.to_string(),
            })
        })
        .collect::<Result<Vec<_>, AuthError>>()?;

    let created = repo.create_batch(rows).await?;
    info!(count = created.len(), "baseline data seeded");
    Ok(SeedOutcome::Inserted {
        count: created.len(),
    })
}
