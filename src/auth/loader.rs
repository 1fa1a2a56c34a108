use std::sync::Arc;

use rusqlite::Connection;
use thiserror::Error;

use crate::db::models::User;
use crate::db::users;
use crate::state::DbPool;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Database error: {0}")]
    Database(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// Restores a user from the string id stored in a session.
///
/// An id that does not parse or does not match a row is `Ok(None)`; only
/// storage failures are errors.
pub trait UserLoader: Send + Sync {
    fn load_user(&self, user_id: &str) -> Result<Option<User>, LoaderError>;
}

pub type DynUserLoader = Arc<dyn UserLoader>;

/// Look up a user by string-encoded id on an open connection.
pub fn load_user(conn: &Connection, user_id: &str) -> rusqlite::Result<Option<User>> {
    match user_id.trim().parse::<i64>() {
        Ok(id) => users::find_by_id(conn, id),
        Err(_) => {
            tracing::debug!(user_id, "session carried a malformed user id");
            Ok(None)
        }
    }
}

pub struct SqliteUserLoader {
    pool: DbPool,
}

impl SqliteUserLoader {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserLoader for SqliteUserLoader {
    fn load_user(&self, user_id: &str) -> Result<Option<User>, LoaderError> {
        let conn = self.pool.get()?;
        Ok(load_user(&conn, user_id)?)
    }
}
