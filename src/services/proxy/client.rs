//! Forwards a (possibly identity-enriched) request to its upstream and relays
//! the response back without touching status, headers or body.

use std::time::Duration;

use std::error::Error as StdError;

use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, Response, header};
use http_body_util::LengthLimitError;
use thiserror::Error;

use super::routes::Route;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("failed to build response: {0}")]
    Response(#[from] axum::http::Error),
}

/// Connection-scoped headers that must not cross the proxy hop.
const HOP_BY_HOP: [header::HeaderName; 6] = [
    header::CONNECTION,
    header::HOST,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Pooled HTTP client; cheap to clone.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl UpstreamClient {
    pub fn new(timeout: Duration, max_body_bytes: usize) -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            max_body_bytes,
        })
    }

    pub async fn forward(
        &self,
        route: &Route,
        request: Request<Body>,
    ) -> Result<Response<Body>, ProxyError> {
        let (parts, body) = request.into_parts();
        let target = route.target_url(parts.uri.path(), parts.uri.query());
        // chunked bodies are only capped while streaming, so the limit shows up here
        let body = to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|err| {
                if exceeds_limit(&err) {
                    ProxyError::BodyTooLarge {
                        limit: self.max_body_bytes,
                    }
                } else {
                    ProxyError::Body(err)
                }
            })?;

        tracing::debug!(route = %route.id, method = %parts.method, %target, "forwarding upstream");

        let upstream = self
            .client
            .request(parts.method, &target)
            .headers(without_hop_by_hop(&parts.headers))
            .body(body)
            .send()
            .await?;

        let status = upstream.status();
        let headers = without_hop_by_hop(upstream.headers());
        let bytes = upstream.bytes().await?;

        let mut builder = Response::builder().status(status);
        if let Some(target_headers) = builder.headers_mut() {
            target_headers.extend(headers);
        }

        Ok(builder.body(Body::from(bytes))?)
    }
}

/// Whether a body error was caused by a length limit anywhere in its chain.
fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}

fn without_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = headers.clone();
    for name in &HOP_BY_HOP {
        filtered.remove(name);
    }
    filtered.remove("keep-alive");
    filtered.remove("proxy-connection");
    filtered
}
