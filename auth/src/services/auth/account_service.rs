use std::sync::Arc;

use tracing::{info, warn};

use crate::error::AppError;
use crate::repos::error::RepoError;
use crate::repos::user_repo::{UserRow, UserStore};
use crate::services::auth::password;
use crate::services::auth::token_issuer::{IssuedToken, TokenIssuer};

/// Registration and login; the only place that touches password hashes.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    issuer: TokenIssuer,
    bcrypt_cost: u32,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("issuer", &self.issuer)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, issuer: TokenIssuer, bcrypt_cost: u32) -> Self {
        Self {
            users,
            issuer,
            bcrypt_cost,
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<UserRow, AppError> {
        info!(user = %username, "registration attempt");

        if self.users.exists_by_username(username).await? {
            warn!(user = %username, "username already exists");
            return Err(AppError::UsernameTaken(username.to_string()));
        }

        let password_hash = password::hash(password.to_string(), self.bcrypt_cost).await?;

        // a concurrent registration can still win the race; the unique index decides
        let user = self
            .users
            .insert(username, &password_hash)
            .await
            .map_err(|e| match e {
                RepoError::Conflict => AppError::UsernameTaken(username.to_string()),
                other => AppError::from(other),
            })?;

        info!(user = %username, id = user.id, "user registered");
        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AppError> {
        info!(user = %username, "login attempt");

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| {
                warn!(user = %username, "user not found");
                AppError::UserNotFound(username.to_string())
            })?;

        if !password::verify(password.to_string(), user.password_hash).await? {
            warn!(user = %username, "invalid password");
            return Err(AppError::InvalidPassword);
        }

        let token = self.issuer.issue(&user.username)?;
        info!(user = %username, "login succeeded");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use identity::TokenCodec;

    use super::*;
    use crate::repos::memory::MemoryUserStore;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(SECRET).unwrap())
    }

    fn service() -> AccountService {
        AccountService::new(
            Arc::new(MemoryUserStore::default()),
            TokenIssuer::new(codec(), 86_400),
            4,
        )
    }

    #[tokio::test]
    async fn register_then_login_issues_token_for_username() {
        let svc = service();
        let user = svc.register("alice", "wonderland").await.unwrap();
        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "wonderland");

        let token = svc.login("alice", "wonderland").await.unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 86_400);

        let claims = codec().decode(&token.access_token).unwrap();
        assert_eq!(claims.subject, "alice");
        assert!(claims.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let svc = service();
        svc.register("alice", "one").await.unwrap();

        let err = svc.register("alice", "two").await.unwrap_err();
        assert!(matches!(err, AppError::UsernameTaken(name) if name == "alice"));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let svc = service();
        svc.register("bob", "right").await.unwrap();

        let err = svc.login("bob", "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidPassword));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let err = service().login("ghost", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(name) if name == "ghost"));
    }
}
