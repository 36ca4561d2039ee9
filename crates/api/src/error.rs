use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use repos::error::RepoError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("internal failure")]
    InternalFailure(),

    #[error("general failure")]
    Failure(String),

    #[error("validation failure: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("database error: `{0}`")]
    RepoError(#[from] RepoError),

    #[error("token error: `{0}`")]
    TokenError(#[from] common::token::TokenError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::InternalFailure() => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal failure".to_string())
            }
            ApiError::Failure(err) => {
                (StatusCode::BAD_REQUEST, format!("general failure: {}", err))
            }
            ApiError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            ApiError::Conflict(err) => (StatusCode::CONFLICT, err.to_string()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "forbidden".to_string()),
            ApiError::TokenError(_) => {
                (StatusCode::UNAUTHORIZED, "invalid or expired token".to_string())
            }
            ApiError::RepoError(err) => handle_repo_error(err),
        };

        let body = Json(serde_json::json!({
            "result": "failed",
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Storage failures stay opaque to callers; constraint violations map to
/// statuses callers can act on.
fn handle_repo_error(err: &RepoError) -> (StatusCode, String) {
    match err {
        RepoError::NotFound() => (StatusCode::NOT_FOUND, "record not found".to_string()),
        RepoError::UniqueViolation(table, _) => {
            (StatusCode::CONFLICT, format!("{} entry already exists", table))
        }
        RepoError::ForeignKeyViolation(table, _) => {
            (StatusCode::BAD_REQUEST, format!("{} reference does not exist", table))
        }
        RepoError::CheckViolation(table, _) => {
            (StatusCode::BAD_REQUEST, format!("{} constraint violated", table))
        }
        RepoError::InvalidColumn(col) => {
            (StatusCode::BAD_REQUEST, format!("invalid column: {}", col))
        }
        RepoError::DatabaseError(_) | RepoError::TransactionError() | RepoError::Other() => {
            error!("Storage failure: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
        }
    }
}
