//! Drop client-supplied `X-Authenticated-User` at the edge.
//!
//! Runs before the relay so the only way the header reaches a backend is via
//! a verified token.

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
};
use identity::TRUST_HEADER;

pub fn apply<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn(strip_forged_identity))
}

async fn strip_forged_identity(mut req: Request, next: Next) -> Response {
    if req.headers_mut().remove(TRUST_HEADER).is_some() {
        tracing::warn!(
            path = %req.uri().path(),
            "dropped client-supplied identity header"
        );
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{HeaderMap, Request},
        routing::get,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    async fn seen_user(headers: HeaderMap) -> String {
        headers
            .get(TRUST_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("<none>")
            .to_string()
    }

    #[tokio::test]
    async fn forged_header_never_reaches_handler() {
        let app = apply(Router::new().route("/api/readers/1", get(seen_user)));
        let req = Request::builder()
            .uri("/api/readers/1")
            .header("x-authenticated-user", "admin")
            .header("x-authenticated-user", "root")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"<none>");
    }
}
