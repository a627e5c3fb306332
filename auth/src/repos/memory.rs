use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::user_repo::{UserRow, UserStore};

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, UserRow>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRow>> {
        Ok(self.users.lock().unwrap().get(username).cloned())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> RepoResult<UserRow> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(username) {
            return Err(RepoError::Conflict);
        }

        let row = UserRow {
            id: users.len() as i64 + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.insert(username.to_string(), row.clone());
        Ok(row)
    }
}
