//! Identity tokens and the trusted-header contract shared by the e-library
//! gateway, the auth service and backend services.
//!
//! - `codec`: HS512 token issue/verify
//! - `claims`: verified claims and the per-request `Identity`
//! - `trust`: `X-Authenticated-User` writer/reader and the handler extractor

pub mod claims;
pub mod codec;
pub mod trust;

pub use claims::{Claims, Identity};
pub use codec::{
    DEFAULT_TTL_SECONDS, EncodeError, KeyError, MAX_TTL_SECONDS, MIN_SECRET_BYTES, TokenCodec, TokenError,
    default_ttl,
};
pub use trust::{AuthenticatedUser, MissingIdentity, TRUST_HEADER};
