pub mod error;
pub mod routes;
pub mod state;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use taskgen_core::config::Config;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the CORS layer for the configured origins. `*` allows any origin;
/// entries that are not valid header values are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

/// Build the axum Router over an existing state.
/// Used by `serve()` and available for integration testing.
pub fn router(app_state: state::AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/specs/generate", post(routes::specs::generate))
        .route("/api/specs/history", get(routes::specs::history))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Build the Router for a project at `root` with file-backed history.
pub fn build_router(root: &Path, config: &Config) -> Router {
    let app_state = state::AppState::from_config(root, config);
    router(app_state, &config.server.cors_origins)
}

/// Start the HTTP server on `bind:port`.
pub async fn serve(root: &Path, config: &Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    serve_on(root, config, listener).await
}

/// Start the HTTP server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    root: &Path,
    config: &Config,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root, config);

    tracing::info!(
        history = %config.history_path(root).display(),
        "taskgen server listening on http://localhost:{actual_port}"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
