use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::{NewUser, User, DEFAULT_IMAGE_FILE};

pub fn create(conn: &Connection, new: &NewUser) -> rusqlite::Result<User> {
    let image_file = new.image_file.as_deref().unwrap_or(DEFAULT_IMAGE_FILE);
    conn.execute(
        r#"INSERT INTO "user" (username, email, image_file, password) VALUES (?1, ?2, ?3, ?4)"#,
        params![new.username, new.email, image_file, new.password],
    )?;

    let id = conn.last_insert_rowid();
    tracing::debug!(user_id = id, username = %new.username, "user created");
    Ok(User {
        id,
        username: new.username.clone(),
        email: new.email.clone(),
        image_file: image_file.to_string(),
        password: new.password.clone(),
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!(r#"SELECT {} FROM "user" WHERE id = ?1"#, User::COLUMNS),
        params![id],
        User::from_row,
    )
    .optional()
}

pub fn find_by_username(conn: &Connection, username: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!(r#"SELECT {} FROM "user" WHERE username = ?1"#, User::COLUMNS),
        params![username],
        User::from_row,
    )
    .optional()
}

pub fn find_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!(r#"SELECT {} FROM "user" WHERE email = ?1"#, User::COLUMNS),
        params![email],
        User::from_row,
    )
    .optional()
}

/// Update the public profile fields. Returns false if the user does not exist.
pub fn update_profile(
    conn: &Connection,
    id: i64,
    username: &str,
    email: &str,
    image_file: &str,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        r#"UPDATE "user" SET username = ?1, email = ?2, image_file = ?3 WHERE id = ?4"#,
        params![username, email, image_file, id],
    )?;
    Ok(rows > 0)
}

pub fn update_password(conn: &Connection, id: i64, password_hash: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        r#"UPDATE "user" SET password = ?1 WHERE id = ?2"#,
        params![password_hash, id],
    )?;
    Ok(rows > 0)
}

/// Delete a user. Fails with a foreign key error while the user still owns
/// posts, comments or tokens.
pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute(r#"DELETE FROM "user" WHERE id = ?1"#, params![id])?;
    Ok(rows > 0)
}

pub fn count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row(r#"SELECT COUNT(*) FROM "user""#, [], |row| row.get(0))
}
