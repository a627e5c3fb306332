//! End-to-end gateway behaviour against mock upstream services.

use std::collections::HashMap;
use std::time::Duration as StdDuration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use gateway::app::{build_router, build_state};
use gateway::config::Config;
use http_body_util::BodyExt;
use identity::{TokenCodec, default_ttl};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

struct Harness {
    app: Router,
    codec: TokenCodec,
}

fn harness(upstream: &str, readers: &str) -> Harness {
    harness_with(upstream, readers, &[])
}

fn harness_with(upstream: &str, readers: &str, overrides: &[(&'static str, &str)]) -> Harness {
    let mut vars: HashMap<&str, String> = HashMap::from([
        ("JWT_SECRET", SECRET.to_string()),
        ("AUTH_SERVICE_URL", upstream.to_string()),
        ("CATALOG_SERVICE_URL", upstream.to_string()),
        ("READER_SERVICE_URL", readers.to_string()),
        ("UPSTREAM_TIMEOUT_SECONDS", "2".to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert(*key, value.to_string());
    }
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    let state = build_state(&config).unwrap();

    Harness {
        app: build_router(state, &config),
        codec: TokenCodec::new(SECRET.as_bytes()).unwrap(),
    }
}

fn bearer(codec: &TokenCodec, subject: &str) -> String {
    format!("Bearer {}", codec.encode(subject, default_ttl()).unwrap())
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn authenticated_request_reaches_upstream_with_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/readers/1/books"))
        .and(header("x-authenticated-user", "alice"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), &server.uri());
    let req = Request::builder()
        .method("POST")
        .uri("/api/readers/1/books")
        .header("authorization", bearer(&h.codec, "alice"))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"bookId":5}"#))
        .unwrap();

    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(body_json(resp).await["ok"], true);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].body, br#"{"bookId":5}"#);
}

#[tokio::test]
async fn anonymous_catalog_read_is_forwarded_without_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/catalog/books"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), &server.uri());
    let req = Request::builder()
        .uri("/api/catalog/books?page=2")
        // forged identity from the client must be dropped
        .header("x-authenticated-user", "admin")
        .body(Body::empty())
        .unwrap();

    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let received = server.received_requests().await.unwrap();
    assert!(received[0].headers.get("x-authenticated-user").is_none());
}

#[tokio::test]
async fn expired_token_on_protected_route_is_rejected_at_the_edge() {
    let server = MockServer::start().await;
    let h = harness(&server.uri(), &server.uri());

    let stale = h
        .codec
        .encode_at("alice", default_ttl(), Utc::now() - Duration::hours(25))
        .unwrap();
    let req = Request::builder()
        .method("DELETE")
        .uri("/api/catalog/books/9")
        .header("authorization", format!("Bearer {stale}"))
        .body(Body::empty())
        .unwrap();

    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"]["code"], "UNAUTHORIZED");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_token_on_public_route_still_passes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/catalog/authors"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), &server.uri());
    let req = Request::builder()
        .uri("/api/catalog/authors")
        .header("authorization", "Bearer garbage")
        .body(Body::empty())
        .unwrap();

    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let received = server.received_requests().await.unwrap();
    assert!(received[0].headers.get("x-authenticated-user").is_none());
    // credential is relayed untouched
    assert_eq!(received[0].headers.get("authorization").unwrap(), "Bearer garbage");
}

#[tokio::test]
async fn auth_endpoints_are_public() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"accessToken": "t"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), &server.uri());
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"username":"alice","password":"pw"}"#))
        .unwrap();

    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["accessToken"], "t");
}

#[tokio::test]
async fn upstream_errors_are_relayed_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/readers/404"))
        .respond_with(ResponseTemplate::new(404).insert_header("x-upstream", "reader"))
        .mount(&server)
        .await;

    let h = harness(&server.uri(), &server.uri());
    let req = Request::builder()
        .uri("/api/readers/404")
        .header("authorization", bearer(&h.codec, "bob"))
        .body(Body::empty())
        .unwrap();

    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get("x-upstream").unwrap(), "reader");
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let server = MockServer::start().await;
    // nothing listens on the discard port
    let h = harness(&server.uri(), "http://127.0.0.1:9");

    let req = Request::builder()
        .uri("/api/readers/1")
        .header("authorization", bearer(&h.codec, "alice"))
        .body(Body::empty())
        .unwrap();

    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(resp).await["error"]["code"], "BAD_GATEWAY");
}

#[tokio::test]
async fn unknown_path_has_no_route() {
    let server = MockServer::start().await;
    let h = harness(&server.uri(), &server.uri());

    let req = Request::builder()
        .uri("/api/unknown")
        .header("authorization", bearer(&h.codec, "alice"))
        .body(Body::empty())
        .unwrap();

    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_is_served_locally() {
    let server = MockServer::start().await;
    let h = harness(&server.uri(), &server.uri());

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = h.app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(body_json(resp).await["status"], "ok");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn non_ascii_subject_reaches_upstream_intact() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/readers/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), &server.uri());
    let req = Request::builder()
        .uri("/api/readers/1")
        .header("authorization", bearer(&h.codec, "читатель"))
        .body(Body::empty())
        .unwrap();

    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let received = server.received_requests().await.unwrap();
    let value = received[0].headers.get("x-authenticated-user").unwrap();
    assert_eq!(value.as_bytes(), "читатель".as_bytes());
}

#[tokio::test]
async fn dot_segments_cannot_reroute_past_the_policy() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    // every upstream on one host, so a normalized path would land on catalog
    let h = harness(&server.uri(), &server.uri());

    for uri in [
        "/api/auth/../catalog/books/9",
        "/api/auth/%2e%2e/catalog/books/9",
        "/api/auth/./../catalog/books/9",
    ] {
        let req = Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let resp = h.app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_json(resp).await["error"]["code"], "BAD_REQUEST");
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn oversized_body_without_length_is_payload_too_large() {
    let server = MockServer::start().await;
    let h = harness_with(&server.uri(), &server.uri(), &[("BODY_LIMIT_BYTES", "16")]);

    // no content-length header: the limit applies while the body is read
    let req = Request::builder()
        .method("POST")
        .uri("/api/readers/1/books")
        .header("authorization", bearer(&h.codec, "alice"))
        .body(Body::from(vec![b'x'; 64]))
        .unwrap();

    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(resp).await["error"]["code"], "PAYLOAD_TOO_LARGE");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn slow_upstream_times_out_at_the_edge() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/catalog/books"))
        .respond_with(ResponseTemplate::new(200).set_delay(StdDuration::from_secs(3)))
        .mount(&server)
        .await;

    let h = harness_with(
        &server.uri(),
        &server.uri(),
        &[("REQUEST_TIMEOUT_SECONDS", "1"), ("UPSTREAM_TIMEOUT_SECONDS", "5")],
    );
    let req = Request::builder()
        .uri("/api/catalog/books")
        .body(Body::empty())
        .unwrap();

    let resp = h.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body_json(resp).await["error"]["code"], "GATEWAY_TIMEOUT");
}
