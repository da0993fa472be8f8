//! Defines routes for the upload-to-view flow.
//!
//! ## Structure
//! - **Page & session endpoints**
//!   - `GET  /`                — upload UI or viewer UI per session state
//!   - `POST /upload`          — multipart upload, runs the pipeline
//!   - `GET  /refresh`         — clears the session binding
//!   - `GET  /file_size_error` — client-side size check target
//!
//! - **Artifact endpoints**
//!   - `GET /load/{unique_filename}`                 — entry-point HTML
//!   - `GET /load/assets/{category}/{filename}`      — session-bound asset
//!
//! The upload route carries its own body limit so oversized requests are
//! rejected at the transport layer with the same size-exceeded notice.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        viewer_handlers::{file_size_error, index, load_asset, load_document, refresh, upload},
    },
    services::validation::MAX_UPLOAD_BYTES,
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Build and return the router for all viewer routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // page & session
        .route("/", get(index))
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES as usize)),
        )
        .route("/refresh", get(refresh))
        .route("/file_size_error", get(file_size_error))
        // artifact serving
        .route("/load/{unique_filename}", get(load_document))
        .route("/load/assets/{category}/{filename}", get(load_asset))
}
