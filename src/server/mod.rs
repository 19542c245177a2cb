//! HTTP surface of the worker.
//!
//! Preview readers and apply endpoints live under `/api/ai/*`; the event
//! system calls back into `/api/jobs`.

pub mod handlers;
pub mod input;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{WorkerError, WorkerResult};

/// CORS policy for `origin` (`*` allows any).
///
/// # Errors
/// [`WorkerError::Config`] if `origin` is not a valid header value.
pub fn cors_layer(origin: &str) -> WorkerResult<CorsLayer> {
    let allow_origin = if origin == "*" {
        AllowOrigin::from(Any)
    } else {
        let value = HeaderValue::from_str(origin)
            .map_err(|e| WorkerError::Config(format!("invalid ALLOWED_ORIGIN: {e}")))?;
        AllowOrigin::exact(value)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderName::from_static("x-ratelimit-remaining"),
            header::RETRY_AFTER,
        ]))
}

/// Router with CORS and request tracing applied.
///
/// # Errors
/// Returns an error if the configured origin is invalid.
pub fn build_app(state: Arc<AppState>) -> WorkerResult<Router> {
    let cors = cors_layer(&state.config.allowed_origin)?;
    Ok(create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// Start the HTTP server on the configured port.
///
/// The server stops accepting new connections when `shutdown_signal` completes.
///
/// # Errors
/// Returns an error if the app cannot be built or the server fails to start.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let app = build_app(state)?;

    tracing::info!("content AI worker listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}
