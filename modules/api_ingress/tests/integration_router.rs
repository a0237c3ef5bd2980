//! Router-level behaviour of the ingress middleware stack.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    routing::{get, post},
    Router,
};
use tower::ServiceExt;

use api_ingress::{ApiIngress, ApiIngressConfig};

async fn echo(body: String) -> String {
    body
}

fn app(config: ApiIngressConfig) -> Router {
    let routes = Router::new()
        .route("/ping", get(|| async { "pong" }))
        .route("/echo", post(echo));
    ApiIngress::new(config).build_router(routes)
}

#[tokio::test]
async fn module_routes_are_reachable() {
    let response = app(ApiIngressConfig::default())
        .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"pong");
}

#[tokio::test]
async fn unknown_route_gets_json_404_with_request_id() {
    let response = app(ApiIngressConfig::default())
        .oneshot(
            Request::builder()
                .uri("/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("x-request-id"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "not found");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let config = ApiIngressConfig {
        body_limit_bytes: 8,
        ..Default::default()
    };
    let response = app(config)
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/echo")
                .header("content-length", "32")
                .body(Body::from("x".repeat(32)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn cors_headers_only_when_enabled() {
    let preflight = || {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/ping")
            .header("origin", "http://example.test")
            .header("access-control-request-method", "GET")
            .body(Body::empty())
            .unwrap()
    };

    let with_cors = app(ApiIngressConfig {
        cors_enabled: true,
        ..Default::default()
    })
    .oneshot(preflight())
    .await
    .unwrap();
    assert!(with_cors
        .headers()
        .contains_key("access-control-allow-origin"));

    let without_cors = app(ApiIngressConfig::default())
        .oneshot(preflight())
        .await
        .unwrap();
    assert!(!without_cors
        .headers()
        .contains_key("access-control-allow-origin"));
}
