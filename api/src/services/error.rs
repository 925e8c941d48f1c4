use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use thiserror::Error;

use crate::auth::guards::Empty;
use crate::response::ApiResponse;

/// Failure modes shared by the domain services.
///
/// Each variant carries the user-facing message; [`IntoResponse`] maps the
/// variant to its HTTP status so handlers can bail with a single `match` arm.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request shape or field values failed validation.
    #[error("{0}")]
    Validation(String),

    /// Credentials did not check out.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but this account may not perform the operation.
    #[error("{0}")]
    Forbidden(String),

    /// The referenced record does not exist. Surfaced as a neutral no-match
    /// result so callers cannot probe which field failed.
    #[error("{0}")]
    NotFound(String),

    /// A lookup resolved to more than one student and was refused.
    #[error("{0}")]
    Ambiguous(String),

    /// A uniqueness rule was violated (duplicate email or NISN).
    #[error("{0}")]
    Conflict(String),

    /// Too many requests of a throttled kind inside the window.
    #[error("{0}")]
    RateLimited(String),

    /// The store answered with something that breaks a schema invariant.
    #[error("data integrity error: {0}")]
    Integrity(String),

    /// The store rejected the operation; fatal for the enclosing request.
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Ambiguous(_) => StatusCode::CONFLICT,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::Integrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "service call failed");
        }
        (
            status,
            Json(ApiResponse::<Empty>::error(self.to_string())),
        )
            .into_response()
    }
}
