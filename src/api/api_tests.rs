#[cfg(test)]
mod router_tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        routing::get,
    };
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use tower::ServiceExt;

    use crate::api::handlers::root_handler::root;
    use crate::observability::{AppMetrics, metrics_middleware};
    use crate::security::middleware::security_headers_middleware;

    fn app() -> Router {
        Router::new()
            .route("/", get(root))
            .layer(axum::middleware::from_fn(security_headers_middleware))
    }

    #[tokio::test]
    async fn root_reports_online() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["online"], true);
    }

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers["X-Content-Type-Options"], "nosniff");
        assert_eq!(headers["X-Frame-Options"], "DENY");
        assert!(headers.contains_key("Strict-Transport-Security"));
    }

    #[tokio::test]
    async fn metrics_layer_counts_requests() {
        let metrics = Arc::new(AppMetrics::default());
        let layer_metrics = metrics.clone();
        let app = Router::new()
            .route("/", get(root))
            .layer(axum::middleware::from_fn(move |req, next| {
                metrics_middleware(req, next, layer_metrics.clone())
            }));

        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert_eq!(metrics.http_requests_total.load(Ordering::SeqCst), 3);
        assert_eq!(metrics.active_connections.load(Ordering::SeqCst), 0);
        assert_eq!(metrics.errors_total.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
