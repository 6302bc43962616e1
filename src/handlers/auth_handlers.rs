//! Login and registration handlers.
//!
//! Thin glue over the authenticator and the user store: credentials in,
//! token + user out; arbitrary registration body in, body + assigned id out.

use crate::{
    errors::AppError,
    handlers::AppState,
    models::user::{Credentials, LoginResponse},
};
use axum::{Json, extract::State};
use serde_json::Value;

/// `POST /login` — verify credentials and issue an access token.
///
/// A mismatch answers the fixed 400 message. Authenticator failures are not
/// converted here; they propagate through the shared error channel.
pub async fn login(
    State(state): State<AppState>,
    Json(creds): Json<Credentials>,
) -> Result<Json<LoginResponse>, AppError> {
    match state.auth.authenticate(&creds).await? {
        Some(payload) => Ok(Json(payload)),
        None => Err(AppError::IncorrectCredentials),
    }
}

/// `POST /register` — append an arbitrary user object.
///
/// No shape validation and no uniqueness checks beyond the assigned id.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let user = state.store.register(body).await?;
    Ok(Json(user))
}
