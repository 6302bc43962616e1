//! Service layer: the upload pipeline, the user record store, and the
//! authenticator. Handlers receive these through shared router state.

pub mod auth_service;
pub mod upload_service;
pub mod user_store;
