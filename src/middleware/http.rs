//! Transport-level middleware applied in front of the auth pipeline.
//!
//! - Request id generation + propagation (`x-request-id`), also forwarded upstream
//! - Access log spans carrying method, path and request id
//! - Body size limit and global timeout from `Config`
//! - Security response headers, only when the upstream did not set them

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::Request;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::AppError;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub fn apply(router: Router, config: &Config) -> Router {
    let layers = ServiceBuilder::new()
        // Make the service error `Infallible` by turning errors into JSON responses.
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            if err.is::<tower::timeout::error::Elapsed>() {
                AppError::GatewayTimeout
            } else {
                tracing::error!(error = %err, "unhandled middleware error");
                AppError::Internal
            }
        }))
        // Generate a request id if missing; it is forwarded upstream with the request
        // and echoed on the response.
        .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID))
        // Access log span per request, tagged with the request id.
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                let request_id = req
                    .headers()
                    .get(REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = %request_id,
                )
            }),
        )
        // Content-Length over the limit is refused here with 413; chunked bodies are
        // capped while the proxy reads them.
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        // Bound the whole request, upstream round trip included.
        .layer(TimeoutLayer::new(config.request_timeout));

    security_headers(router.layer(layers))
}

// Applied outermost so gateway-generated errors carry them too.
fn security_headers(router: Router) -> Router {
    [
        ("x-content-type-options", "nosniff"),
        ("x-frame-options", "DENY"),
        ("referrer-policy", "no-referrer"),
    ]
    .into_iter()
    .fold(router, |router, (name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
    })
}
