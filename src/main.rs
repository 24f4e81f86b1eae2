//! chat-relay - local listener for the `/api/chat` proxy
//!
//! Serves the same contract a hosted deployment would, with permissive CORS
//! so a front end on another local port can call it.

use axum::response::Response;
use chat_relay::api::{create_router, internal_error_response, AppState};
use chat_relay::config::RelayConfig;
use chat_relay::proxy::ProxyAdapter;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Read .env before the filter so RUST_LOG can live there too
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Failed to load environment file"),
    }

    // Configuration
    let config = RelayConfig::from_env();
    let proxy = ProxyAdapter::from_config(&config);

    match proxy.config_error() {
        None => tracing::info!(
            model = %proxy.defaults().model,
            max_tokens = proxy.defaults().max_tokens,
            upstream = %config.anthropic_base_url,
            "Proxy configured"
        ),
        Some(e) => tracing::error!(
            error = %e,
            "Proxy is not configured; every /api/chat request will fail. Set ANTHROPIC_API_KEY."
        ),
    }

    let state = AppState::new(Arc::new(proxy));

    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("Local API server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[allow(clippy::needless_pass_by_value)] // signature fixed by CatchPanicLayer
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Error in chat handler");
    internal_error_response()
}

/// Returns when the server should stop accepting connections.
async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT - shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM - shutting down");
        }
    }
}
