//! HTTP handlers.

pub mod auth_handlers;
pub mod health_handlers;
pub mod upload_handlers;

use crate::services::{
    auth_service::Authenticator, upload_service::UploadService, user_store::UserStore,
};

/// Shared state handed to every handler by the router.
#[derive(Clone)]
pub struct AppState {
    pub uploads: UploadService,
    pub store: UserStore,
    pub auth: Authenticator,
}
