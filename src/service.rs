use crate::profile::HardhatConfig;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::{net::SocketAddr, sync::Arc};

/// Return a 404 Not Found response
pub async fn return_404() -> Response {
    (StatusCode::NOT_FOUND, "not found").into_response()
}

/// Return a 200 OK response
pub async fn return_200() -> Response {
    (StatusCode::OK, "ok").into_response()
}

/// Return the resolved configuration as JSON.
pub async fn return_config(State(config): State<Arc<HardhatConfig>>) -> Response {
    match config.to_json() {
        Ok(json) => Json(json).into_response(),
        Err(err) => {
            tracing::error!(%err, "failed to render configuration");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}

/// Build the router serving the configuration and a healthcheck.
pub fn router(config: HardhatConfig) -> Router {
    Router::new()
        .route("/healthcheck", get(return_200))
        .route("/config", get(return_config))
        .fallback(return_404)
        .with_state(Arc::new(config))
}

/// Serve the resolved configuration on the given socket address.
pub fn serve_config(
    socket: impl Into<SocketAddr>,
    config: HardhatConfig,
) -> tokio::task::JoinHandle<()> {
    let router = router(config);

    let addr = socket.into();
    tokio::spawn(async move {
        match tokio::net::TcpListener::bind(&addr).await {
            Ok(listener) => {
                tracing::info!(%addr, "serving configuration");
                if let Err(err) = axum::serve(listener, router).await {
                    tracing::error!(%err, "serve failed");
                }
            }
            Err(err) => {
                tracing::error!(%err, "failed to bind to the address");
            }
        };
    })
}
