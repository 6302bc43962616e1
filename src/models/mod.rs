//! Data models for the upload and auth surfaces.
//!
//! `UploadedFile` is the pipeline's unit of work and the upload response
//! body; the user types map to the record store via `sqlx::FromRow` and
//! serialize naturally as JSON via `serde`.

pub mod upload;
pub mod user;
