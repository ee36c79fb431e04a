//! In-memory user repository for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use super::{RepoError, UserRepository};
use crate::models::user::{NewUser, User};

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: Vec<User>,
}

impl Table {
    fn insert(&mut self, user: NewUser) -> Result<User, RepoError> {
        if self.rows.iter().any(|u| u.username == user.username) {
            return Err(RepoError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        self.next_id += 1;
        let now = Utc::now();
        let row = User {
            id: self.next_id,
            username: user.username,
            nick_name: user.nick_name,
            password_hash: user.password_hash,
            email: user.email,
            created_at: now,
            created_by: user.created_by.clone(),
            updated_at: now,
            updated_by: user.created_by,
        };
        self.rows.push(row.clone());
        Ok(row)
    }
}

/// Users kept in a `Vec` behind a mutex. Can be switched offline to
/// simulate a store outage.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    table: Mutex<Table>,
    offline: AtomicBool,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// When offline, every operation fails with [`RepoError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn table(&self) -> Result<std::sync::MutexGuard<'_, Table>, RepoError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepoError::Unavailable("connection refused".into()));
        }
        self.table
            .lock()
            .map_err(|_| RepoError::Unavailable("poisoned".into()))
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        self.table()?.insert(user)
    }

    async fn create_batch(&self, users: Vec<NewUser>) -> Result<Vec<User>, RepoError> {
        let mut table = self.table()?;
        let snapshot = (table.next_id, table.rows.len());
        let mut created = Vec::with_capacity(users.len());
        for user in users {
            match table.insert(user) {
                Ok(row) => created.push(row),
                Err(e) => {
                    table.next_id = snapshot.0;
                    table.rows.truncate(snapshot.1);
                    return Err(e);
                }
            }
        }
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.table()?.rows.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.table()?.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .table()?
            .rows
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update_nick_name(
        &self,
        id: i64,
        nick_name: &str,
        updated_by: &str,
    ) -> Result<Option<User>, RepoError> {
        let mut table = self.table()?;
        let Some(row) = table.rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        row.nick_name = nick_name.to_string();
        row.updated_by = updated_by.to_string();
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let mut table = self.table()?;
        let before = table.rows.len();
        table.rows.retain(|u| u.id != id);
        Ok(table.rows.len() < before)
    }

    async fn count(&self) -> Result<i64, RepoError> {
        Ok(self.table()?.rows.len() as i64)
    }

    async fn ping(&self) -> Result<(), RepoError> {
        self.table().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            nick_name: username.to_uppercase(),
            password_hash: "hash".into(),
            email: format!("{username}@example.com"),
            created_by: "system".into(),
        }
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let repo = MemoryUserRepository::new();
        repo.create(new_user("alice")).await.unwrap();
        let err = repo.create(new_user("alice")).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
        assert_eq!(1, repo.count().await.unwrap());
    }

    #[tokio::test]
    async fn failed_batch_leaves_no_rows() {
        let repo = MemoryUserRepository::new();
        let err = repo
            .create_batch(vec![new_user("a"), new_user("b"), new_user("a")])
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
        assert_eq!(0, repo.count().await.unwrap());
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let repo = MemoryUserRepository::new();
        repo.set_offline(true);
        assert!(matches!(
            repo.ping().await.unwrap_err(),
            RepoError::Unavailable(_)
        ));
        repo.set_offline(false);
        assert!(repo.ping().await.is_ok());
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let repo = MemoryUserRepository::new();
        let alice = repo.create(new_user("alice")).await.unwrap();

        let updated = repo
            .update_nick_name(alice.id, "Al", "admin")
            .await
            .unwrap()
            .unwrap();
        assert_eq!("Al", updated.nick_name);
        assert_eq!("admin", updated.updated_by);

        assert!(repo.update_nick_name(99, "x", "admin").await.unwrap().is_none());
        assert!(repo.delete(alice.id).await.unwrap());
        assert!(!repo.delete(alice.id).await.unwrap());
    }
}
