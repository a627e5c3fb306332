use std::sync::Arc;

use chrono::Duration;
use identity::TokenCodec;
use tracing::{debug, error};

use crate::error::AppError;

/// Access token handed back to the client after login.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// Signs access tokens with the secret shared with the gateway.
#[derive(Clone, Debug)]
pub struct TokenIssuer {
    codec: Arc<TokenCodec>,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(codec: Arc<TokenCodec>, ttl_seconds: i64) -> Self {
        Self {
            codec,
            // out-of-range values surface as an encode error at issue time
            ttl: Duration::try_seconds(ttl_seconds).unwrap_or(Duration::MAX),
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl.num_seconds().max(0) as u64
    }

    pub fn issue(&self, username: &str) -> Result<IssuedToken, AppError> {
        let access_token = self.codec.encode(username, self.ttl).map_err(|e| {
            error!(error = %e, "failed to sign access token");
            AppError::Internal
        })?;

        debug!(user = %username, ttl_seconds = self.ttl_seconds(), "issued access token");

        Ok(IssuedToken {
            access_token,
            token_type: "Bearer",
            expires_in: self.ttl_seconds(),
        })
    }
}
