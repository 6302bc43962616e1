//! HTTP handlers for the upload pipeline.
//!
//! Both upload routes follow the same shape: gate on the declared content
//! type, stream the multipart body into staging, relocate, respond with the
//! file metadata. Parse problems are the client's fault (400); anything that
//! breaks during relocation is ours (500, cause logged only).

use crate::{
    errors::AppError,
    handlers::AppState,
    models::upload::UploadedFile,
    services::upload_service::UploadError,
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::{HeaderMap, HeaderValue, header},
    response::Response,
};
use tokio_util::io::ReaderStream;

/// Field name the single-file route reads.
const SINGLE_FIELD: &str = "file";
/// Field name the multi-file route reads (repeatable).
const MULTI_FIELD: &str = "files";

/// Reject requests that declare a JSON body. Uploads are never JSON-encoded.
fn ensure_not_json(headers: &HeaderMap) -> Result<(), AppError> {
    let media_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase());
    if media_type.as_deref() == Some("application/json") {
        return Err(AppError::BadRequest);
    }
    Ok(())
}

/// Host used to build public URLs, from the request's Host header.
fn request_host(headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost")
        .to_string()
}

/// Drain the multipart stream, staging every file part named `field_name`.
///
/// Non-file parts and unrelated fields are read past and dropped.
async fn stage_matching_fields(
    state: &AppState,
    mut multipart: Multipart,
    field_name: &str,
) -> Result<Vec<UploadedFile>, AppError> {
    let mut staged = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(UploadError::Multipart)?
    {
        if field.name() != Some(field_name) || field.file_name().is_none() {
            continue;
        }
        staged.push(state.uploads.stage_field(field).await?);
    }
    Ok(staged)
}

/// `POST /upload` — exactly one file under the `file` field.
///
/// A repeated field keeps its last occurrence.
pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadedFile>, AppError> {
    ensure_not_json(&headers)?;
    let multipart = multipart.map_err(|_| AppError::BadRequest)?;

    let mut staged = stage_matching_fields(&state, multipart, SINGLE_FIELD).await?;
    let file = staged.pop().ok_or(AppError::BadRequest)?;

    let host = request_host(&headers);
    let file = state.uploads.relocate(file, &host).await?;
    Ok(Json(file))
}

/// `POST /upload-multiple` — any number of files under the repeatable
/// `files` field. All-or-nothing: one failed relocation fails the request,
/// already relocated siblings stay on disk.
pub async fn upload_files(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<UploadedFile>>, AppError> {
    ensure_not_json(&headers)?;
    let multipart = multipart.map_err(|_| AppError::BadRequest)?;

    let staged = stage_matching_fields(&state, multipart, MULTI_FIELD).await?;
    if staged.is_empty() {
        return Err(AppError::BadRequest);
    }

    let host = request_host(&headers);
    let files = state.uploads.relocate_all(staged, &host).await?;
    Ok(Json(files))
}

/// `GET /uploads/{name}` — stream a stored file back out.
pub async fn get_upload(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let (file, len) = state.uploads.open_public(&name).await?;

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&len.to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("0")),
    );
    Ok(response)
}
