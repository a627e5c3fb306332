//! Bearer token → `X-Authenticated-User` relay.
//!
//! Every request passes through. A valid `Authorization: Bearer <jwt>` adds
//! the trust header and binds the `Identity` into request extensions for the
//! access policy and handlers further down. A missing, foreign-scheme or
//! invalid token forwards the request untouched: this layer only enriches,
//! the access policy decides whether an anonymous request may proceed.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::{self, Next},
    response::Response,
};
use identity::{Identity, TokenCodec, TokenError, trust};

const BEARER_PREFIX: &str = "Bearer ";

/// Result of inspecting one request's credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    NoToken,
    Invalid(TokenError),
    Authenticated(Identity),
}

/// Token discovery + decode. Pure; no request mutation.
pub fn authenticate(codec: &TokenCodec, headers: &HeaderMap) -> RelayOutcome {
    let Some(token) = bearer_token(headers) else {
        return RelayOutcome::NoToken;
    };

    match codec.decode(token) {
        Ok(claims) => RelayOutcome::Authenticated(claims.into_identity()),
        Err(err) => RelayOutcome::Invalid(err),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.trim().is_empty())
}

pub fn apply<S>(router: Router<S>, codec: Arc<TokenCodec>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(codec, relay_middleware))
}

async fn relay_middleware(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let outcome = authenticate(&codec, req.headers());
    let elapsed_us = started.elapsed().as_micros() as u64;

    match outcome {
        RelayOutcome::NoToken => {
            tracing::debug!(path = %req.uri().path(), "no bearer token, forwarding anonymously");
        }
        RelayOutcome::Invalid(err) => {
            tracing::warn!(
                path = %req.uri().path(),
                reason = err.kind(),
                elapsed_us,
                "bearer token rejected, forwarding anonymously"
            );
        }
        RelayOutcome::Authenticated(identity) => {
            match trust::set_identity_header(req.headers_mut(), &identity) {
                Ok(()) => {
                    tracing::info!(
                        user = %identity,
                        path = %req.uri().path(),
                        elapsed_us,
                        "authenticated request"
                    );
                    req.extensions_mut().insert(identity);
                }
                Err(_) => {
                    tracing::warn!(
                        path = %req.uri().path(),
                        reason = "subject_not_header_safe",
                        "bearer token rejected, forwarding anonymously"
                    );
                }
            }
        }
    }

    next.run(req).await
}
