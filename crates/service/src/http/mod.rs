//! HTTP handlers and routers for the service.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use http::Method;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod health;
pub mod help;
pub mod register;
pub mod share;

pub use config::Config;
pub use error::ApiError;
pub use handlers::not_found_handler;

use crate::ServiceState;

const STATUS_PREFIX: &str = "/_status";

/// Every route of the service, without tracing or CORS layers.
pub fn router(state: ServiceState, max_upload_bytes: usize) -> Router {
    let db_routes = get(db::get_handler)
        .post(db::put_handler)
        .delete(db::delete_handler);

    Router::new()
        .route("/", get(help::home_handler))
        .route("/help", get(help::help_handler))
        .route("/examples", get(help::examples_handler))
        .route("/register", post(register::handler))
        // private collections
        .route("/db", db_routes.clone())
        .route("/db/", db_routes.clone())
        .route("/db/*path", db_routes)
        // sharing
        .route("/share", get(share::share_handler))
        .route("/share/", get(share::share_handler))
        .route("/share/*path", get(share::share_handler))
        .route(
            "/shared/:token",
            get(share::shared_handler).delete(share::delete_shared_handler),
        )
        .route("/shared/:token/", get(share::shared_handler))
        .route("/shared/:token/*path", get(share::shared_handler))
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Run the HTTP server until `shutdown_rx` fires.
pub async fn run(
    config: Config,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(config.log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST, Method::DELETE])
        .allow_headers(vec![ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN])
        .allow_origin(Any)
        .allow_credentials(false);

    let router = router(state, config.max_upload_bytes)
        .layer(cors_layer)
        .layer(trace_layer);

    tracing::info!(addr = ?listen_addr, "DBFS listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
