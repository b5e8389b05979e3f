use crate::errors::handlers::not_found;
use axum::Router;
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};

/// Mount `routes` under `api_prefix` and add the shared fallback and trace layer.
///
/// An empty prefix mounts at the root.
pub fn create_router(routes: Router, api_prefix: &str) -> Router {
    let router = if api_prefix.is_empty() {
        routes
    } else {
        Router::new().nest(api_prefix, routes)
    };

    router.fallback(not_found).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// Bind and serve `router` until `shutdown` resolves.
///
/// Returns once in-flight requests have drained. Use
/// [`shutdown_signal`](super::shutdown_signal) for SIGINT/SIGTERM handling.
///
/// # Errors
/// Returns an error if the listener cannot bind or the server fails while running.
pub async fn create_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;

    info!("Server starting on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        })?;

    info!("Server stopped accepting connections");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_create_router_nests_under_prefix() {
        let routes = Router::new().route("/ping", get(|| async { "pong" }));
        let app = create_router(routes, "/api");

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_app_stops_on_shutdown() {
        let config = ServerConfig::new("127.0.0.1".to_string(), 0);
        let routes = Router::new().route("/ping", get(|| async { "pong" }));

        create_app(create_router(routes, ""), &config, async {})
            .await
            .unwrap();
    }
}
