//! Defines routes for the auth and upload endpoints.
//!
//! ## Structure
//! - **Auth endpoints**
//!   - `POST /login`    — credential login, issues an access token
//!   - `POST /register` — append a new user record
//!
//! - **Upload endpoints**
//!   - `POST /upload`          — single file under field `file`
//!   - `POST /upload-multiple` — many files under repeatable field `files`
//!   - `GET  /uploads/{name}`  — fetch a relocated file
//!
//! Health endpoints `/healthz` and `/readyz` are mounted at the root.

use crate::handlers::{
    AppState,
    auth_handlers::{login, register},
    health_handlers::{healthz, readyz},
    upload_handlers::{get_upload, upload_file, upload_files},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Request bodies above this size are rejected before parsing.
const MAX_BODY_BYTES: usize = 200 * 1024 * 1024;

/// Build and return the router for all API routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // auth endpoints
        .route("/login", post(login))
        .route("/register", post(register))
        // upload endpoints
        .route("/upload", post(upload_file))
        .route("/upload-multiple", post(upload_files))
        .route("/uploads/{name}", get(get_upload))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
