//! User record store backed by SQLite.
//!
//! The store is append-and-query only: registration inserts a row, login
//! looks one up. Ids are assigned inside the insert statement itself, so two
//! concurrent registrations can never observe the same current maximum.

use crate::models::user::UserRecord;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("malformed stored profile: {0}")]
    Profile(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to the users table. Cheap to clone; the pool is shared.
#[derive(Clone)]
pub struct UserStore {
    db: Arc<SqlitePool>,
}

impl UserStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Shared pool handle, used by the readiness probe.
    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// Append a new user built from an arbitrary registration body.
    ///
    /// The id is `max(id) + 1` computed inside the INSERT; the aggregate over
    /// an empty table yields NULL, so the first user gets id 1. No field
    /// validation and no uniqueness checks beyond the id.
    ///
    /// Returns the body merged with the assigned id. A non-object body is
    /// stored as-is but contributes no fields to the response.
    pub async fn register(&self, body: Value) -> StoreResult<Value> {
        let username = body
            .get("username")
            .and_then(Value::as_str)
            .map(str::to_string);
        let password = body
            .get("password")
            .and_then(Value::as_str)
            .map(str::to_string);
        let profile = body.to_string();

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (id, username, password, profile)
             SELECT COALESCE(MAX(id), 0) + 1, ?, ?, ? FROM users
             RETURNING id",
        )
        .bind(username)
        .bind(password)
        .bind(&profile)
        .fetch_one(&*self.db)
        .await?;

        let mut user = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        user.insert("id".into(), Value::from(id));
        Ok(Value::Object(user))
    }

    /// Look up a user by username. Returns None when no row matches.
    pub async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password, profile FROM users WHERE username = ? LIMIT 1",
        )
        .bind(username)
        .fetch_optional(&*self.db)
        .await?;
        Ok(row)
    }
}
