use std::fmt;

use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

pub const USERNAME_MAX: usize = 20;
pub const EMAIL_MAX: usize = 120;
pub const IMAGE_FILE_MAX: usize = 20;
pub const PASSWORD_MAX: usize = 60;
pub const TITLE_MAX: usize = 100;
pub const CONTENT_TYPE_MAX: usize = 20;
pub const TOKEN_MAX: usize = 60;

pub const DEFAULT_IMAGE_FILE: &str = "default.jpg";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

fn require(field: &'static str, value: &str, max: Option<usize>) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    match max {
        Some(max) if value.chars().count() > max => Err(ValidationError::TooLong { field, max }),
        _ => Ok(()),
    }
}

// -- User --

/// Serializes as `{id, username}`; contact details and the hash stay private.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub email: String,
    #[serde(skip_serializing)]
    pub image_file: String,
    /// bcrypt hash
    #[serde(skip_serializing)]
    pub password: String,
}

impl User {
    pub(crate) const COLUMNS: &'static str = "id, username, email, image_file, password";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            image_file: row.get(3)?,
            password: row.get(4)?,
        })
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<User(id='{}', username='{}', email='{}', image_file='{}')>",
            self.id, self.username, self.email, self.image_file
        )
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// Already hashed; see `auth::password::hash_password`.
    pub password: String,
    pub image_file: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_profile()?;
        require("password", &self.password, Some(PASSWORD_MAX))
    }

    /// Everything except the password hash, so callers can reject bad input
    /// before paying for bcrypt.
    pub fn validate_profile(&self) -> Result<(), ValidationError> {
        require("username", &self.username, Some(USERNAME_MAX))?;
        require("email", &self.email, Some(EMAIL_MAX))?;
        if let Some(image) = &self.image_file {
            require("image_file", image, Some(IMAGE_FILE_MAX))?;
        }
        Ok(())
    }
}

// -- Post --

#[derive(Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub date_posted: DateTime<Utc>,
    pub content: String,
    pub content_type: String,
    pub user_id: i64,
}

/// External projection of a post, as served to JSON clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializedPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub content_type: String,
    pub user: i64,
    pub username: String,
}

impl Post {
    pub(crate) const COLUMNS: &'static str =
        "id, title, date_posted, content, content_type, user_id";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            date_posted: row.get(2)?,
            content: row.get(3)?,
            content_type: row.get(4)?,
            user_id: row.get(5)?,
        })
    }

    /// Project this post together with its author.
    ///
    /// `author` must be the user referenced by `user_id`.
    pub fn serialize(&self, author: &User) -> SerializedPost {
        debug_assert_eq!(self.user_id, author.id, "author does not own this post");
        SerializedPost {
            id: self.id,
            title: self.title.clone(),
            content: self.content.clone(),
            content_type: self.content_type.clone(),
            user: self.user_id,
            username: author.username.clone(),
        }
    }
}

impl fmt::Debug for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Post(id='{}', title='{}', date_posted='{}')>",
            self.id, self.title, self.date_posted
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub content_type: String,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title, Some(TITLE_MAX))?;
        require("content", &self.content, None)?;
        require("content_type", &self.content_type, Some(CONTENT_TYPE_MAX))?;
        Ok(())
    }
}

// -- Comment --

#[derive(Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub date_posted: DateTime<Utc>,
    pub user_id: i64,
    pub post_id: i64,
}

impl Comment {
    pub(crate) const COLUMNS: &'static str = "id, content, date_posted, user_id, post_id";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            content: row.get(1)?,
            date_posted: row.get(2)?,
            user_id: row.get(3)?,
            post_id: row.get(4)?,
        })
    }
}

/// The `{id, username}` pair attached to serialized comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: i64,
    pub username: String,
}

impl From<&User> for Author {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// External projection of a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializedComment {
    pub id: i64,
    pub content: String,
    pub author: Author,
}

impl Comment {
    pub fn serialize(&self, author: &User) -> SerializedComment {
        debug_assert_eq!(self.user_id, author.id, "author did not write this comment");
        SerializedComment {
            id: self.id,
            content: self.content.clone(),
            author: Author::from(author),
        }
    }
}

impl fmt::Debug for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Comment(id='{}', post='{}', user='{}', date_posted='{}')>",
            self.id, self.post_id, self.user_id, self.date_posted
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub content: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("content", &self.content, None)
    }
}

// -- Token --

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub id: i64,
    pub date_expired: DateTime<Utc>,
    pub token: String,
    pub user_id: i64,
}

impl Token {
    pub(crate) const COLUMNS: &'static str = "id, date_expired, token, user_id";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date_expired: row.get(1)?,
            token: row.get(2)?,
            user_id: row.get(3)?,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.date_expired <= now
    }
}
