use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use chrono::Utc;

use crate::auth::identity::Identity;
use crate::auth::session;
use crate::db::models::User;
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated user plus the session token that proved it.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

/// Extractor that requires authentication.
/// Returns 401 if no valid session found.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts, &state.config.auth.cookie_name)
            .ok_or(AppError::Unauthorized)?
            .to_string();

        match restore(state, &token)? {
            Identity::User(user) => Ok(CurrentUser { user, token }),
            Identity::Anonymous(_) => Err(AppError::Unauthorized),
        }
    }
}

/// Optional identity; anonymous instead of 401.
pub struct MaybeUser(pub Identity);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match session_token(parts, &state.config.auth.cookie_name) {
            Some(token) => Ok(MaybeUser(restore(state, token)?)),
            None => Ok(MaybeUser(Identity::anonymous())),
        }
    }
}

/// Resolve a session token to an identity: token row first, then the login
/// manager's loader with the stored user id.
fn restore(state: &AppState, token: &str) -> Result<Identity, AppError> {
    let conn = state.db.get()?;
    let user_id = session::find_valid(&conn, token, Utc::now())?.map(|t| t.user_id.to_string());
    drop(conn);

    Ok(state.login.restore(user_id.as_deref())?)
}

/// Session token from the named cookie, falling back to a bearer header.
pub fn session_token<'a>(parts: &'a Parts, cookie_name: &str) -> Option<&'a str> {
    cookie_value(parts, cookie_name).or_else(|| {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    })
}

fn cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name && !val.is_empty() {
                Some(val)
            } else {
                None
            }
        })
}
