//! User persistence.
//!
//! Services depend on the [`UserRepository`] trait; the Postgres
//! implementation lives in [`pg`].

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod pg;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::user::{NewUser, User};

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryUserRepository;
pub use pg::PgUserRepository;

/// Persistence errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Storage operations on users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. Fails with [`RepoError::Conflict`] on a taken username.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    /// Insert several users atomically.
    async fn create_batch(&self, users: Vec<NewUser>) -> Result<Vec<User>, RepoError>;

    async fn list(&self) -> Result<Vec<User>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Returns the updated user, or `None` if no user has `id`.
    async fn update_nick_name(
        &self,
        id: i64,
        nick_name: &str,
        updated_by: &str,
    ) -> Result<Option<User>, RepoError>;

    /// Returns whether a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;

    async fn count(&self) -> Result<i64, RepoError>;

    /// Round-trip to the store.
    async fn ping(&self) -> Result<(), RepoError>;
}
