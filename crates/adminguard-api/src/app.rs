//! Application builder: wires router, middleware and state into an Axum app
//! and serves it until shutdown.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use axum::middleware as axum_middleware;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use adminguard_core::error::AppError;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Binds the configured address and serves until `shutdown` resolves.
pub async fn serve(
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::configuration(format!("Failed to bind {addr}: {e}")))?;

    info!(addr = %addr, "AdminGuard listening");

    axum::serve(
        listener,
        build_app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))
}
