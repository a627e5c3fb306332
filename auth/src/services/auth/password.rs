//! bcrypt hashing, kept off the async executor.

use tracing::error;

use crate::error::AppError;

pub async fn hash(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            error!(error = %e, "password hashing task failed");
            AppError::Internal
        })?
        .map_err(|e| {
            error!(error = %e, "failed to hash password");
            AppError::Internal
        })
}

pub async fn verify(password: String, password_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .map_err(|e| {
            error!(error = %e, "password verification task failed");
            AppError::Internal
        })?
        .map_err(|e| {
            // a stored hash bcrypt cannot parse is a data problem, not a wrong password
            error!(error = %e, "failed to verify password hash");
            AppError::Internal
        })
}
