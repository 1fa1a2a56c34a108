use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::{Author, Comment, SerializedComment};

const SERIALIZED_SELECT: &str = r#"SELECT c.id, c.content, c.user_id, u.username
    FROM comment c JOIN "user" u ON u.id = c.user_id"#;

fn serialized_from_row(row: &Row<'_>) -> rusqlite::Result<SerializedComment> {
    Ok(SerializedComment {
        id: row.get(0)?,
        content: row.get(1)?,
        author: Author {
            id: row.get(2)?,
            username: row.get(3)?,
        },
    })
}

pub fn create(
    conn: &Connection,
    user_id: i64,
    post_id: i64,
    content: &str,
) -> rusqlite::Result<Comment> {
    create_at(conn, user_id, post_id, content, Utc::now())
}

pub fn create_at(
    conn: &Connection,
    user_id: i64,
    post_id: i64,
    content: &str,
    date_posted: DateTime<Utc>,
) -> rusqlite::Result<Comment> {
    conn.execute(
        "INSERT INTO comment (content, date_posted, user_id, post_id) VALUES (?1, ?2, ?3, ?4)",
        params![content, date_posted, user_id, post_id],
    )?;

    Ok(Comment {
        id: conn.last_insert_rowid(),
        content: content.to_string(),
        date_posted,
        user_id,
        post_id,
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Comment>> {
    conn.query_row(
        &format!("SELECT {} FROM comment WHERE id = ?1", Comment::COLUMNS),
        params![id],
        Comment::from_row,
    )
    .optional()
}

/// Comments on a post, newest first.
pub fn list_for_post(conn: &Connection, post_id: i64) -> rusqlite::Result<Vec<Comment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM comment WHERE post_id = ?1 ORDER BY date_posted DESC, id DESC",
        Comment::COLUMNS
    ))?;
    let rows = stmt.query_map(params![post_id], Comment::from_row)?;
    rows.collect()
}

/// Comments on a post with their authors attached, newest first.
pub fn serialize_for_post(
    conn: &Connection,
    post_id: i64,
) -> rusqlite::Result<Vec<SerializedComment>> {
    let mut stmt = conn.prepare(&format!(
        "{SERIALIZED_SELECT} WHERE c.post_id = ?1 ORDER BY c.date_posted DESC, c.id DESC"
    ))?;
    let rows = stmt.query_map(params![post_id], serialized_from_row)?;
    rows.collect()
}

pub fn list_by_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Comment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM comment WHERE user_id = ?1 ORDER BY date_posted DESC, id DESC",
        Comment::COLUMNS
    ))?;
    let rows = stmt.query_map(params![user_id], Comment::from_row)?;
    rows.collect()
}

pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM comment WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}
