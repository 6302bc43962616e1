//! User records and the login exchange.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored user row.
///
/// `profile` holds the registration body verbatim as JSON text; `username`
/// and `password` are lifted out at insert time so login can query them.
/// Both are nullable because registration accepts arbitrary bodies.
#[derive(Clone, FromRow, Debug)]
pub struct UserRecord {
    pub id: i64,
    pub username: Option<String>,
    pub password: Option<String>,
    pub profile: String,
}

/// Login request body. Lives only for the duration of the request and is
/// never persisted.
#[derive(Deserialize, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Successful login payload: a signed access token plus the user object
/// with its password field removed.
#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: serde_json::Value,
}
