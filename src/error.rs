use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Request data rejected before anything reaches a store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("dueDate must use the MM/DD/YYYY format")]
    MalformedDate,
    #[error("dueDate is not a valid calendar date")]
    DateOutOfRange,
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("name must not be empty")]
    EmptyName,
    #[error("email is not a valid address")]
    InvalidEmail,
    #[error("password must be at least {0} characters long")]
    PasswordTooShort(usize),
    #[error("email is already registered")]
    EmailTaken,
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

/// Reasons a caller could not be authenticated.
///
/// The variants are kept apart for logging only. What leaves the process is
/// [`AuthError::public_message`], which never tells an unknown account apart
/// from a wrong password, nor an expired token from a forged one.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("account not found")]
    AccountNotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidOrExpiredToken,
}

impl AuthError {
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::AccountNotFound | AuthError::InvalidCredentials => "invalid credentials",
            AuthError::MissingToken => "missing bearer token",
            AuthError::InvalidOrExpiredToken => "invalid or expired token",
        }
    }
}

/// The caller is authenticated but the targeted task is not theirs, or does
/// not exist. Both cases are the same error on purpose.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    #[error("you do not have access to this task")]
    NoAccess,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("email is already registered")]
    DuplicateEmail,
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("unauthenticated: {0}")]
    Unauthenticated(#[from] AuthError),
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AccessError),
    #[error(transparent)]
    Store(StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AppError::Validation(ValidationError::EmailTaken),
            other => AppError::Store(other),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Unauthenticated(err) => {
                (StatusCode::UNAUTHORIZED, err.public_message().to_string())
            }
            AppError::Unauthorized(err) => (StatusCode::UNAUTHORIZED, err.to_string()),
            AppError::Store(err) => {
                tracing::error!("Storage error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_failures_share_one_public_message() {
        assert_eq!(
            AuthError::AccountNotFound.public_message(),
            AuthError::InvalidCredentials.public_message()
        );
    }

    #[test]
    fn duplicate_email_surfaces_as_validation() {
        let err: AppError = StoreError::DuplicateEmail.into();
        assert!(matches!(err, AppError::Validation(ValidationError::EmailTaken)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn status_codes_follow_the_taxonomy() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (ValidationError::MalformedDate.into(), StatusCode::BAD_REQUEST),
            (AuthError::InvalidOrExpiredToken.into(), StatusCode::UNAUTHORIZED),
            (AccessError::NoAccess.into(), StatusCode::UNAUTHORIZED),
            (
                StoreError::Corrupt("bad status".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
