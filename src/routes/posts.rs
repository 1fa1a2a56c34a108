use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::db::models::{NewComment, NewPost, SerializedComment, SerializedPost};
use crate::db::{comments, posts};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/{id}", get(get_post).delete(delete_post))
        .route(
            "/api/posts/{id}/comments",
            get(list_comments).post(create_comment),
        )
}

/// GET /api/posts
async fn list_posts(State(state): State<AppState>) -> AppResult<Json<Vec<SerializedPost>>> {
    let conn = state.db.get()?;
    Ok(Json(posts::serialize_all(&conn)?))
}

/// GET /api/posts/{id}
async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SerializedPost>> {
    let conn = state.db.get()?;
    posts::find_serialized(&conn, id)?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// POST /api/posts
async fn create_post(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(new_post): Json<NewPost>,
) -> AppResult<Response> {
    new_post.validate()?;

    let conn = state.db.get()?;
    let post = posts::create(&conn, current.user.id, &new_post)?;
    tracing::info!(post_id = post.id, user_id = current.user.id, "post published");

    Ok((StatusCode::CREATED, Json(post.serialize(&current.user))).into_response())
}

/// DELETE /api/posts/{id}. Only the author may delete.
async fn delete_post(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let conn = state.db.get()?;
    let post = posts::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    if post.user_id != current.user.id {
        return Err(AppError::Forbidden);
    }

    let policy = state.config.database.post_delete_policy;
    posts::delete(&conn, id, policy)?;
    tracing::info!(post_id = id, ?policy, "post deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/posts/{id}/comments, newest first.
async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<SerializedComment>>> {
    let conn = state.db.get()?;
    if posts::find_by_id(&conn, id)?.is_none() {
        return Err(AppError::NotFound);
    }
    Ok(Json(comments::serialize_for_post(&conn, id)?))
}

/// POST /api/posts/{id}/comments
async fn create_comment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(new_comment): Json<NewComment>,
) -> AppResult<Response> {
    new_comment.validate()?;

    let conn = state.db.get()?;
    if posts::find_by_id(&conn, id)?.is_none() {
        return Err(AppError::NotFound);
    }
    let comment = comments::create(&conn, current.user.id, id, &new_comment.content)?;

    Ok((StatusCode::CREATED, Json(comment.serialize(&current.user))).into_response())
}
