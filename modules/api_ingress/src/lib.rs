//! HTTP host for the recipes server.
//!
//! Modules hand their routers to [`ApiIngress::build_router`], which adds the
//! `/health` endpoint, the 404 fallback and the shared middleware stack.
//! [`ApiIngress::serve`] binds the listener and runs until cancelled.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::{middleware::from_fn, routing::get, Router};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod error;
pub mod request_id;
pub mod shutdown;
mod web;

pub use config::ApiIngressConfig;
pub use error::AppError;

pub struct ApiIngress {
    config: ApiIngressConfig,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Wrap module routes with `/health`, the JSON 404 fallback and middleware.
    pub fn build_router(&self, routes: Router) -> Router {
        let x_request_id = request_id::header();

        let mut router = routes
            .route("/health", get(web::health_check))
            .fallback(error::not_found);

        // Each `.layer` wraps everything added before it, so the list runs
        // innermost first. Outermost to innermost the stack is:
        // SetRequestId -> PropagateRequestId -> Trace -> push_req_id -> Timeout -> CORS -> BodyLimit
        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));
        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        if self.config.request_timeout_sec > 0 {
            router = router.layer(TimeoutLayer::new(Duration::from_secs(
                self.config.request_timeout_sec,
            )));
        }
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = router.layer(request_id::create_trace_layer());
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    /// Bind `addr` and serve `router` until `cancel` fires.
    pub async fn serve(
        &self,
        addr: SocketAddr,
        router: Router,
        cancel: CancellationToken,
    ) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
        tracing::info!("HTTP server bound on {}", listener.local_addr()?);

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_is_served_on_an_empty_router() {
        let router = ApiIngress::new(ApiIngressConfig::default()).build_router(Router::new());
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn serve_stops_on_cancel() {
        let ingress = ApiIngress::new(ApiIngressConfig::default());
        let cancel = CancellationToken::new();
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();

        let task = {
            let cancel = cancel.clone();
            let router = ingress.build_router(Router::new());
            tokio::spawn(async move {
                ApiIngress::new(ApiIngressConfig::default())
                    .serve(addr, router, cancel)
                    .await
            })
        };
        cancel.cancel();
        let res = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("server did not stop")
            .expect("join");
        assert!(res.is_ok());
    }
}
