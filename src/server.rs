//! HTTP surface: JSON API under `/api`, health probe, and static files for
//! everything else.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::commands::{auth, scoreboard, system, wheel};
use crate::error::AppError;
use crate::AppState;

/// Build the application router. `static_dir` backs every non-API path.
pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let api = Router::new()
        .route("/verify-passphrase", post(auth::verify_passphrase))
        .route("/scoreboard", get(scoreboard::get_scoreboard))
        .route("/scoreboard/update", post(scoreboard::update_scoreboard))
        .route("/scoreboard/add", post(scoreboard::add_person))
        .route("/scoreboard/clear", post(scoreboard::clear_scoreboard))
        .route("/scoreboard/{id}", patch(scoreboard::patch_person))
        .route("/scoreboard/{id}/remove", post(scoreboard::remove_person))
        .route("/roster", get(wheel::get_roster))
        .route("/standings", get(wheel::get_standings))
        .route("/spin", get(wheel::spin));

    Router::new()
        .nest("/api", api)
        .route("/health", get(system::health))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C or SIGTERM.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr, static_dir: &Path) -> Result<(), AppError> {
    let app = router(state, static_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind {addr}: {e}")))?;
    let local = listener.local_addr().unwrap_or(addr);
    tracing::info!("Server running on http://{}", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {e}")))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
