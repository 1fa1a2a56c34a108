use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::db::models::SerializedPost;
use crate::db::{posts, users};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/users/{id}/posts", get(user_posts))
}

/// GET /api/users/{id}/posts
async fn user_posts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<SerializedPost>>> {
    let conn = state.db.get()?;
    if users::find_by_id(&conn, id)?.is_none() {
        return Err(AppError::NotFound);
    }
    Ok(Json(posts::serialize_by_user(&conn, id)?))
}
