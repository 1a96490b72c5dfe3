use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::checkin::ScanError;
use crate::issuance::IssueError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    // Client mistakes are warnings; only server faults are errors.
    fn log(&self) {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => {
                warn!(code = self.code(), message = %msg, "Request rejected");
            }
            AppError::InternalServerError(msg) => {
                error!(error = ?self, message = %msg, "Application error");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
        }
    }
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::MissingPayload
            | ScanError::MalformedPayload
            | ScanError::IndexOutOfRange { .. }
            | ScanError::NameMismatch => AppError::ValidationError(err.to_string()),
            ScanError::BookingNotFound(_) | ScanError::NoTicketsForBooking(_) => {
                AppError::NotFound(err.to_string())
            }
            ScanError::Forbidden => AppError::Forbidden(err.to_string()),
            ScanError::Storage(e) => AppError::DatabaseError(e),
        }
    }
}

impl From<IssueError> for AppError {
    fn from(err: IssueError) -> Self {
        match err {
            IssueError::NoTravelers | IssueError::InvalidTraveler(_) => {
                AppError::ValidationError(err.to_string())
            }
            IssueError::TravelNotFound(_) => AppError::NotFound(err.to_string()),
            IssueError::BadgeExhausted | IssueError::Render(_) => {
                AppError::InternalServerError(err.to_string())
            }
            IssueError::Storage(e) => AppError::DatabaseError(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::InternalServerError(_) => "An internal error occurred".to_string(),
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
        };

        error_response(code, public_message, None, status)
    }
}
