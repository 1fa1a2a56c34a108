use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rusqlite::Connection;

use crate::db::models::Token;
use crate::db::tokens;

const MAX_SESSION_HOURS: u64 = 24 * 365 * 10;

/// Issue a new session token for a user, valid for `hours`.
pub fn create_session(conn: &Connection, user_id: i64, hours: u64) -> rusqlite::Result<Token> {
    let expires = Utc::now() + Duration::hours(hours.min(MAX_SESSION_HOURS) as i64);
    let token = tokens::create(conn, user_id, &generate_token(), expires)?;
    tracing::info!(user_id, "session issued");
    Ok(token)
}

/// The token row for `token`, only if it has not expired at `now`.
pub fn find_valid(
    conn: &Connection,
    token: &str,
    now: DateTime<Utc>,
) -> rusqlite::Result<Option<Token>> {
    Ok(tokens::find_by_token(conn, token)?.filter(|t| !t.is_expired(now)))
}

/// Delete a session by token.
pub fn delete_session(conn: &Connection, token: &str) -> rusqlite::Result<()> {
    tokens::delete(conn, token)?;
    Ok(())
}

/// 24 random bytes as 48 hex characters; stays within the 60-char column.
fn generate_token() -> String {
    let bytes: [u8; 24] = rand::thread_rng().gen();
    hex::encode(bytes)
}
