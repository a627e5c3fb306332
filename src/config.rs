/*
 * Responsibility
 * - Load gateway settings from the environment (.env supported)
 * - Validate eagerly: a missing/weak secret or bad upstream URL refuses startup
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use identity::MIN_SECRET_BYTES;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error(
        "JWT_SECRET is {len} bytes, at least {min} bytes are required",
        min = MIN_SECRET_BYTES
    )]
    WeakSecret { len: usize },
}

/// Upstream base URLs for the static route table.
#[derive(Debug, Clone)]
pub struct Upstreams {
    pub auth: Url,
    pub catalog: Url,
    pub readers: Url,
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Shared with the auth service; never logged.
    pub jwt_secret: String,
    pub jwt_leeway_seconds: u64,

    pub upstreams: Upstreams,
    pub upstream_timeout: Duration,

    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("jwt_leeway_seconds", &self.jwt_leeway_seconds)
            .field("upstreams", &self.upstreams)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("body_limit_bytes", &self.body_limit_bytes)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source (tests pass a map instead of the process env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };

        let addr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::WeakSecret {
                len: jwt_secret.len(),
            });
        }

        let jwt_leeway_seconds = parse_or(&lookup, "JWT_LEEWAY_SECONDS", 0)?;

        let upstreams = Upstreams {
            auth: url_or(&lookup, "AUTH_SERVICE_URL", "http://127.0.0.1:8081")?,
            catalog: url_or(&lookup, "CATALOG_SERVICE_URL", "http://127.0.0.1:8082")?,
            readers: url_or(&lookup, "READER_SERVICE_URL", "http://127.0.0.1:8083")?,
        };

        let upstream_timeout =
            Duration::from_secs(parse_or(&lookup, "UPSTREAM_TIMEOUT_SECONDS", 10)?);
        let request_timeout =
            Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECONDS", 30)?);
        let body_limit_bytes = parse_or(&lookup, "BODY_LIMIT_BYTES", 1024 * 1024)?;

        Ok(Self {
            addr,
            app_env,
            jwt_secret,
            jwt_leeway_seconds,
            upstreams,
            upstream_timeout,
            request_timeout,
            body_limit_bytes,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn url_or<F>(lookup: &F, key: &'static str, default: &str) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid(key))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(key));
    }
    Ok(url)
}
