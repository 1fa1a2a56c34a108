use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Deserialize;

use crate::db::models::{NewPost, Post, SerializedPost};

/// What happens to a post's comments when the post is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostDeletePolicy {
    /// Comments stay behind, still pointing at the removed post id.
    #[default]
    RetainComments,
    /// Comments are removed in the same transaction as the post.
    CascadeComments,
}

const SERIALIZED_SELECT: &str = r#"SELECT p.id, p.title, p.content, p.content_type, p.user_id, u.username
    FROM post p JOIN "user" u ON u.id = p.user_id"#;

fn serialized_from_row(row: &Row<'_>) -> rusqlite::Result<SerializedPost> {
    Ok(SerializedPost {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        content_type: row.get(3)?,
        user: row.get(4)?,
        username: row.get(5)?,
    })
}

pub fn create(conn: &Connection, user_id: i64, new: &NewPost) -> rusqlite::Result<Post> {
    create_at(conn, user_id, new, Utc::now())
}

/// Insert a post with an explicit `date_posted`.
pub fn create_at(
    conn: &Connection,
    user_id: i64,
    new: &NewPost,
    date_posted: DateTime<Utc>,
) -> rusqlite::Result<Post> {
    conn.execute(
        "INSERT INTO post (title, date_posted, content, content_type, user_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![new.title, date_posted, new.content, new.content_type, user_id],
    )?;

    let id = conn.last_insert_rowid();
    tracing::debug!(post_id = id, user_id, "post created");
    Ok(Post {
        id,
        title: new.title.clone(),
        date_posted,
        content: new.content.clone(),
        content_type: new.content_type.clone(),
        user_id,
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Post>> {
    conn.query_row(
        &format!("SELECT {} FROM post WHERE id = ?1", Post::COLUMNS),
        params![id],
        Post::from_row,
    )
    .optional()
}

/// All posts, newest first.
pub fn list_recent(conn: &Connection) -> rusqlite::Result<Vec<Post>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM post ORDER BY date_posted DESC, id DESC",
        Post::COLUMNS
    ))?;
    let rows = stmt.query_map([], Post::from_row)?;
    rows.collect()
}

/// Posts authored by `user_id`, newest first.
pub fn list_by_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Post>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM post WHERE user_id = ?1 ORDER BY date_posted DESC, id DESC",
        Post::COLUMNS
    ))?;
    let rows = stmt.query_map(params![user_id], Post::from_row)?;
    rows.collect()
}

pub fn update(conn: &Connection, id: i64, changes: &NewPost) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE post SET title = ?1, content = ?2, content_type = ?3 WHERE id = ?4",
        params![changes.title, changes.content, changes.content_type, id],
    )?;
    Ok(rows > 0)
}

/// Delete a post. Returns false if no such post existed.
pub fn delete(conn: &Connection, id: i64, policy: PostDeletePolicy) -> rusqlite::Result<bool> {
    let rows = match policy {
        PostDeletePolicy::RetainComments => {
            // foreign_keys can only be toggled outside a transaction
            conn.pragma_update(None, "foreign_keys", false)?;
            let result = conn.execute("DELETE FROM post WHERE id = ?1", params![id]);
            let restored = conn.pragma_update(None, "foreign_keys", true);
            if let Err(e) = &restored {
                tracing::error!(post_id = id, "Failed to re-enable foreign keys: {}", e);
            }
            let rows = result?;
            restored?;
            rows
        }
        PostDeletePolicy::CascadeComments => {
            let tx = conn.unchecked_transaction()?;
            let comments = tx.execute("DELETE FROM comment WHERE post_id = ?1", params![id])?;
            let rows = tx.execute("DELETE FROM post WHERE id = ?1", params![id])?;
            tx.commit()?;
            tracing::debug!(post_id = id, comments, "cascaded comment delete");
            rows
        }
    };
    Ok(rows > 0)
}

pub fn find_serialized(conn: &Connection, id: i64) -> rusqlite::Result<Option<SerializedPost>> {
    conn.query_row(
        &format!("{SERIALIZED_SELECT} WHERE p.id = ?1"),
        params![id],
        serialized_from_row,
    )
    .optional()
}

/// Every post in its external projection, newest first.
pub fn serialize_all(conn: &Connection) -> rusqlite::Result<Vec<SerializedPost>> {
    let mut stmt = conn.prepare(&format!(
        "{SERIALIZED_SELECT} ORDER BY p.date_posted DESC, p.id DESC"
    ))?;
    let rows = stmt.query_map([], serialized_from_row)?;
    rows.collect()
}

pub fn serialize_by_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<SerializedPost>> {
    let mut stmt = conn.prepare(&format!(
        "{SERIALIZED_SELECT} WHERE p.user_id = ?1 ORDER BY p.date_posted DESC, p.id DESC"
    ))?;
    let rows = stmt.query_map(params![user_id], serialized_from_row)?;
    rows.collect()
}
