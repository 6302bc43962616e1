use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::{
    auth_service::AuthError, upload_service::UploadError, user_store::StoreError,
};

/// HTTP-level error type shared by all handlers.
///
/// Client-visible bodies are fixed: structural client mistakes and server-side
/// I/O failures answer with constant plain-text strings, a credential mismatch
/// with one constant JSON message. Causes stay in the server log.
#[derive(Debug, Error)]
pub enum AppError {
    /// Structurally wrong client input: JSON content type on an upload route,
    /// no file in the expected field, unusable file name.
    #[error("bad request")]
    BadRequest,

    /// Server-side failure while staging or relocating a file.
    #[error("internal server error")]
    Internal,

    /// Credentials did not match a stored user.
    #[error("incorrect credentials")]
    IncorrectCredentials,

    /// Requested stored file does not exist.
    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::InvalidFileName | UploadError::Multipart(_) => AppError::BadRequest,
            UploadError::NotFound(_) => AppError::NotFound,
            UploadError::Io(err) => {
                tracing::error!("upload I/O failure: {}", err);
                AppError::Internal
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest => (StatusCode::BAD_REQUEST, "Bad Request!").into_response(),
            AppError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error!").into_response()
            }
            AppError::IncorrectCredentials => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Username or password is incorrect!" })),
            )
                .into_response(),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found!").into_response(),
            AppError::Store(err) => {
                tracing::error!("record store failure: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error!").into_response()
            }
            AppError::Auth(err) => {
                tracing::error!("authenticator failure: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error!").into_response()
            }
        }
    }
}
