use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::identity::IdentityView;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session;
use crate::db::models::{NewUser, User};
use crate::db::users;
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

// -- Cookie helpers --

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours.saturating_mul(3600);
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

// -- Handlers --

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Response> {
    if req.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".into()));
    }

    let mut new_user = NewUser {
        username: req.username.trim().to_string(),
        email: req.email.trim().to_lowercase(),
        password: String::new(),
        image_file: None,
    };
    new_user.validate_profile()?;
    new_user.password = hash_password(&req.password, state.config.auth.bcrypt_cost)?;
    new_user.validate()?;

    let conn = state.db.get()?;
    let user = users::create(&conn, &new_user)?;
    tracing::info!(user_id = user.id, username = %user.username, "user registered");

    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// POST /auth/login. Issues a token and sets the session cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let email = req.email.trim().to_lowercase();

    let user = users::find_by_email(&conn, &email)?
        .filter(|u| verify_password(&req.password, &u.password))
        .ok_or_else(|| {
            tracing::info!("Failed login attempt");
            AppError::Unauthorized
        })?;

    let hours = state.config.auth.token_hours;
    let token = session::create_session(&conn, user.id, hours)?;
    let cookie = session_cookie(&state.config.auth.cookie_name, &token.token, hours);

    Ok((
        StatusCode::OK,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(LoginResponse {
            token: token.token,
            user,
        }),
    )
        .into_response())
}

/// POST /auth/logout. Revokes the presented token.
pub async fn logout(State(state): State<AppState>, current: CurrentUser) -> AppResult<Response> {
    let conn = state.db.get()?;
    session::delete_session(&conn, &current.token)?;
    tracing::info!(user_id = current.user.id, "session revoked");

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(
            header::SET_COOKIE,
            clear_session_cookie(&state.config.auth.cookie_name),
        )]),
    )
        .into_response())
}

/// GET /auth/me
pub async fn me(MaybeUser(identity): MaybeUser) -> Json<IdentityView> {
    Json(IdentityView::from(&identity))
}
