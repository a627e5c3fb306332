use serde::Deserialize;

/// Body of `/register` and `/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl AuthRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.username.len() > 255 {
            return Err("username must be <= 255 chars");
        }
        if self.password.trim().is_empty() {
            return Err("password is required");
        }
        // bcrypt ignores input past 72 bytes
        if self.password.len() > 72 {
            return Err("password must be <= 72 bytes");
        }
        Ok(())
    }
}
