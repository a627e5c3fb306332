use chrono::{DateTime, Utc};

/// Verified token contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    pub fn into_identity(self) -> Identity {
        Identity::from(self)
    }
}

/// The authenticated subject of a single request.
///
/// Lives in request extensions for the duration of one request; never cached
/// or persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    subject: String,
}

impl Identity {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self::new(claims.subject)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.subject)
    }
}
