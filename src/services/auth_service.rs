//! Credential verification and access token issuance.

use crate::models::user::{Credentials, LoginResponse};
use crate::services::user_store::{StoreError, UserStore};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("token encoding failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by issued access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiration, unix seconds.
    pub exp: i64,
}

/// Verifies credentials against the user store and issues HS256 tokens.
///
/// `authenticate` distinguishes a mismatch (`Ok(None)`) from a failure
/// (`Err`): store or signing errors are not rejections and must not be
/// reported to the client as bad credentials.
#[derive(Clone)]
pub struct Authenticator {
    store: UserStore,
    secret: String,
    token_ttl_secs: i64,
}

impl Authenticator {
    pub fn new(store: UserStore, secret: impl Into<String>, token_ttl_secs: i64) -> Self {
        Self {
            store,
            secret: secret.into(),
            token_ttl_secs,
        }
    }

    /// Verify credentials. `Ok(Some)` carries the login payload, `Ok(None)`
    /// means the username is unknown or the password does not match.
    pub async fn authenticate(
        &self,
        creds: &Credentials,
    ) -> Result<Option<LoginResponse>, AuthError> {
        let Some(user) = self.store.find_by_username(&creds.username).await? else {
            return Ok(None);
        };
        if user.password.as_deref() != Some(creds.password.as_str()) {
            return Ok(None);
        }

        let access_token = self.issue_token(user.id)?;
        let user = scrub_profile(user.id, &user.profile)?;
        Ok(Some(LoginResponse { access_token, user }))
    }

    fn issue_token(&self, user_id: i64) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.token_ttl_secs,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }
}

/// Build the client-visible user object: the stored profile plus the id,
/// with any password field removed.
fn scrub_profile(id: i64, profile: &str) -> Result<Value, AuthError> {
    let stored: Value = serde_json::from_str(profile).map_err(StoreError::Profile)?;
    let mut map = match stored {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    map.remove("password");
    map.insert("id".into(), Value::from(id));
    Ok(Value::Object(map))
}
