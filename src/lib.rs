//! upload-api: a mock REST API add-on with credential login, user
//! registration, and single/multi file upload.
//!
//! File parts are streamed into a staging directory by the multipart layer,
//! then relocated (copy + delete, never rename) into a public upload folder
//! and reported back under the URL they are now fetchable from.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use config::AppConfig;
pub use handlers::AppState;
