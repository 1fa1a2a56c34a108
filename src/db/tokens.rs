use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::Token;

pub fn create(
    conn: &Connection,
    user_id: i64,
    token: &str,
    date_expired: DateTime<Utc>,
) -> rusqlite::Result<Token> {
    conn.execute(
        "INSERT INTO token (date_expired, token, user_id) VALUES (?1, ?2, ?3)",
        params![date_expired, token, user_id],
    )?;

    Ok(Token {
        id: conn.last_insert_rowid(),
        date_expired,
        token: token.to_string(),
        user_id,
    })
}

/// Look a token up by its value, expired or not.
pub fn find_by_token(conn: &Connection, token: &str) -> rusqlite::Result<Option<Token>> {
    conn.query_row(
        &format!("SELECT {} FROM token WHERE token = ?1", Token::COLUMNS),
        params![token],
        Token::from_row,
    )
    .optional()
}

pub fn list_by_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Token>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM token WHERE user_id = ?1 ORDER BY date_expired DESC",
        Token::COLUMNS
    ))?;
    let rows = stmt.query_map(params![user_id], Token::from_row)?;
    rows.collect()
}

pub fn delete(conn: &Connection, token: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM token WHERE token = ?1", params![token])?;
    Ok(rows > 0)
}

pub fn delete_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM token WHERE user_id = ?1", params![user_id])
}

/// Remove every token that expired at or before `now`.
pub fn delete_expired(conn: &Connection, now: DateTime<Utc>) -> rusqlite::Result<usize> {
    let rows = conn.execute("DELETE FROM token WHERE date_expired <= ?1", params![now])?;
    if rows > 0 {
        tracing::info!(purged = rows, "expired tokens removed");
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NewUser;
    use crate::db::test_support::migrated_pool;
    use crate::db::{is_unique_violation, users};
    use chrono::Duration;

    fn user_id(conn: &Connection) -> i64 {
        users::create(
            conn,
            &NewUser {
                username: "alice".into(),
                email: "alice@example.com".into(),
                password: "hashed".into(),
                image_file: None,
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn token_value_is_unique() {
        let pool = migrated_pool();
        let conn = pool.get().unwrap();
        let uid = user_id(&conn);
        let expires = Utc::now() + Duration::hours(1);

        create(&conn, uid, "same-token", expires).unwrap();
        let err = create(&conn, uid, "same-token", expires).unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn find_by_token_returns_row() {
        let pool = migrated_pool();
        let conn = pool.get().unwrap();
        let uid = user_id(&conn);
        let created = create(&conn, uid, "abc123", Utc::now() + Duration::hours(1)).unwrap();

        assert_eq!(find_by_token(&conn, "abc123").unwrap(), Some(created));
        assert_eq!(find_by_token(&conn, "missing").unwrap(), None);
    }

    #[test]
    fn delete_expired_keeps_live_tokens() {
        let pool = migrated_pool();
        let conn = pool.get().unwrap();
        let uid = user_id(&conn);
        let now = Utc::now();

        create(&conn, uid, "old", now - Duration::hours(1)).unwrap();
        create(&conn, uid, "live", now + Duration::hours(1)).unwrap();

        assert_eq!(delete_expired(&conn, now).unwrap(), 1);
        let remaining: Vec<String> = list_by_user(&conn, uid)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect();
        assert_eq!(remaining, vec!["live"]);
    }

    #[test]
    fn delete_single_and_all_for_user() {
        let pool = migrated_pool();
        let conn = pool.get().unwrap();
        let uid = user_id(&conn);
        let later = Utc::now() + Duration::hours(1);
        create(&conn, uid, "one", later).unwrap();
        create(&conn, uid, "two", later).unwrap();
        create(&conn, uid, "three", later).unwrap();

        assert!(delete(&conn, "one").unwrap());
        assert!(!delete(&conn, "one").unwrap());
        assert_eq!(delete_for_user(&conn, uid).unwrap(), 2);
    }
}
