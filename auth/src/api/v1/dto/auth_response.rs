use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Seconds until expiry.
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUserResponse {
    pub id: i64,
    pub username: String,
}
