//! Postgres-backed user repository.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{RepoError, UserRepository};
use crate::models::user::{NewUser, User};

const USER_COLUMNS: &str = "id, username, nick_name, password_hash, email, \
     created_at, created_by, updated_at, updated_by";

/// Users stored in the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Turn unique-constraint violations into [`RepoError::Conflict`].
fn map_insert_error(e: sqlx::Error, username: &str) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict(format!("username '{username}' already exists"))
        }
        _ => RepoError::Db(e),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let sql = format!(
            "INSERT INTO users (username, nick_name, password_hash, email, created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.nick_name)
            .bind(&user.password_hash)
            .bind(&user.email)
            .bind(&user.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, &user.username))
    }

    async fn create_batch(&self, users: Vec<NewUser>) -> Result<Vec<User>, RepoError> {
        let sql = format!(
            "INSERT INTO users (username, nick_name, password_hash, email, created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {USER_COLUMNS}"
        );
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(users.len());
        for user in &users {
            let row = sqlx::query_as::<_, User>(&sql)
                .bind(&user.username)
                .bind(&user.nick_name)
                .bind(&user.password_hash)
                .bind(&user.email)
                .bind(&user.created_by)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_insert_error(e, &user.username))?;
            created.push(row);
        }
        tx.commit().await?;
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let rows = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_nick_name(
        &self,
        id: i64,
        nick_name: &str,
        updated_by: &str,
    ) -> Result<Option<User>, RepoError> {
        let sql = format!(
            "UPDATE users SET nick_name = $2, updated_by = $3, updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(nick_name)
            .bind(updated_by)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, RepoError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> Result<(), RepoError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
