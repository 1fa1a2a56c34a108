use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::auth::loader::LoaderError;
use crate::db::models::ValidationError;
use crate::db::{is_foreign_key_violation, is_unique_violation};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("User lookup failed: {0}")]
    Loader(#[from] LoaderError),

    #[error("Password hashing error: {0}")]
    Password(#[from] bcrypt::BcryptError),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn internal(kind: &str, err: &dyn std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("{} error: {}", kind, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Database(e) if is_unique_violation(e) => {
                tracing::debug!("Unique constraint rejected write: {}", e);
                (StatusCode::CONFLICT, "Already exists".to_string())
            }
            AppError::Database(e) if is_foreign_key_violation(e) => {
                tracing::debug!("Foreign key rejected write: {}", e);
                (StatusCode::CONFLICT, "Referenced record missing".to_string())
            }
            AppError::Database(e) => internal("Database", e),
            AppError::Pool(e) => internal("Pool", e),
            AppError::Loader(e) => internal("Loader", e),
            AppError::Password(e) => internal("Password", e),
            AppError::Internal(msg) => internal("Internal", msg),
        };

        (status, message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn response_status(err: AppError) -> StatusCode {
        let response = err.into_response();
        response.status()
    }

    fn constraint_error(extended_code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(extended_code),
            Some("constraint failed".into()),
        )
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(response_status(AppError::NotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unauthorized_returns_401() {
        assert_eq!(
            response_status(AppError::Unauthorized),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn forbidden_returns_403() {
        assert_eq!(response_status(AppError::Forbidden), StatusCode::FORBIDDEN);
    }

    #[test]
    fn validation_returns_400() {
        assert_eq!(
            response_status(ValidationError::Required("title").into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unique_violation_returns_409() {
        let err = constraint_error(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE);
        assert_eq!(response_status(err.into()), StatusCode::CONFLICT);
    }

    #[test]
    fn other_database_errors_return_500() {
        assert_eq!(
            response_status(rusqlite::Error::QueryReturnedNoRows.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_returns_500() {
        assert_eq!(
            response_status(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
