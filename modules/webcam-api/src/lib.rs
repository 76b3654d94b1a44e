use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

mod memory;

pub use memory::resident_memory_mb;

pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

#[derive(Clone)]
pub struct AppState {
    pub playlist_path: Arc<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    memory_mb: f64,
}

async fn playlist(State(state): State<AppState>) -> Response {
    match tokio::fs::read(state.playlist_path.as_path()).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, PLAYLIST_CONTENT_TYPE)], bytes).into_response(),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %state.playlist_path.display(), error = %e, "Failed to read playlist");
            }
            (StatusCode::SERVICE_UNAVAILABLE, "Playlist not yet generated").into_response()
        }
    }
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        memory_mb: memory::resident_memory_mb(),
    })
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

/// `GET /playlist.m3u8` and `GET /health`; everything else is a 404.
pub fn router(playlist_path: PathBuf) -> Router {
    let state = AppState {
        playlist_path: Arc::new(playlist_path),
    };

    Router::new()
        .route("/playlist.m3u8", get(playlist))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
        // Players must always fetch the latest playlist
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

/// Serve on an already-bound listener until the process exits.
pub async fn serve(listener: TcpListener, playlist_path: PathBuf) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Playlist available at http://{addr}/playlist.m3u8");
    axum::serve(listener, router(playlist_path)).await?;
    Ok(())
}
