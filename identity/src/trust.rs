//! Trusted identity header between the gateway and backend services.
//!
//! The gateway is the only writer of `X-Authenticated-User`; backends sit on
//! an isolated network and take the header at face value. They never see or
//! re-validate the bearer token.

use std::convert::Infallible;

use axum::{
    Json,
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header::InvalidHeaderValue, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::claims::Identity;

pub const TRUST_HEADER: HeaderName = HeaderName::from_static("x-authenticated-user");

/// Set (replace) the trust header on an outgoing request.
///
/// The subject is written as raw UTF-8; `identity_from_headers` reads it back
/// the same way.
pub fn set_identity_header(
    headers: &mut HeaderMap,
    identity: &Identity,
) -> Result<(), InvalidHeaderValue> {
    let value = HeaderValue::from_str(identity.subject())?;
    headers.insert(TRUST_HEADER, value);
    Ok(())
}

/// Read the identity a trusted hop attached, if any.
///
/// Empty, non-UTF-8 or repeated values are treated as absent.
pub fn identity_from_headers(headers: &HeaderMap) -> Option<Identity> {
    let mut values = headers.get_all(&TRUST_HEADER).iter();
    let value = values.next()?;
    if values.next().is_some() {
        return None;
    }

    // not `to_str()`: that rejects every non-ASCII byte
    let subject = std::str::from_utf8(value.as_bytes()).ok()?.trim();
    if subject.is_empty() {
        return None;
    }

    Some(Identity::new(subject))
}

/// Handler extractor for routes that require a caller.
///
/// Rejects with 401 when the gateway did not attach an identity. Use
/// `Option<AuthenticatedUser>` for routes where the caller is optional.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = MissingIdentity;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_headers(&parts.headers)
            .map(AuthenticatedUser)
            .ok_or(MissingIdentity)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(identity_from_headers(&parts.headers).map(AuthenticatedUser))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MissingIdentity;

#[derive(Serialize)]
struct ErrorResponseBody {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: &'static str,
}

impl IntoResponse for MissingIdentity {
    fn into_response(self) -> Response {
        let body = ErrorResponseBody {
            error: ErrorBody {
                code: "UNAUTHORIZED",
                message: "unauthorized",
            },
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}
