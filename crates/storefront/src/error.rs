//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error renders as a JSON body of the form
//! `{"error": <code>, "message": <text>}`, with `field` added for
//! validation failures and `date` for reservation conflicts.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{BookingError, CheckoutError};
use crate::stripe::StripeError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request failed validation.
    #[error("Validation failed on {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// Requested reservation date is already held.
    #[error("Date already reserved: {0}")]
    DateConflict(NaiveDate),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Stripe operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] StripeError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated for the staff endpoints.
    #[error("Unauthorized")]
    Unauthorized,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
}

impl AppError {
    /// Whether this error is a server-side fault worth a Sentry event.
    fn is_server_fault(&self) -> bool {
        match self {
            Self::Internal(_) | Self::Payment(_) => true,
            Self::Database(inner) => matches!(
                inner,
                RepositoryError::Database(_)
                    | RepositoryError::DataCorruption(_)
                    | RepositoryError::DuplicateOrderNumber(_)
            ),
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::DateConflict(_) => StatusCode::CONFLICT,
            Self::Payment(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database(inner) => match inner {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::IllegalTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                RepositoryError::Conflict(_) | RepositoryError::DateConflict(_) => {
                    StatusCode::CONFLICT
                }
                RepositoryError::EmptyOrder => StatusCode::BAD_REQUEST,
                RepositoryError::Database(_)
                | RepositoryError::DataCorruption(_)
                | RepositoryError::DuplicateOrderNumber(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Validation { field, message } => ErrorBody {
                error: "validation_error",
                message: message.clone(),
                field: Some(field),
                date: None,
            },
            Self::DateConflict(date) => ErrorBody {
                error: "date_already_reserved",
                message: "This date is already reserved".to_string(),
                field: None,
                date: Some(*date),
            },
            Self::Payment(_) => ErrorBody {
                error: "payment_error",
                message: "Payment service error".to_string(),
                field: None,
                date: None,
            },
            Self::NotFound(what) => ErrorBody {
                error: "not_found",
                message: format!("{what} not found"),
                field: None,
                date: None,
            },
            Self::Unauthorized => ErrorBody {
                error: "unauthorized",
                message: "Missing or invalid staff token".to_string(),
                field: None,
                date: None,
            },
            Self::Internal(_) => ErrorBody {
                error: "internal_error",
                message: "Internal server error".to_string(),
                field: None,
                date: None,
            },
            // Don't expose internal error details to clients
            Self::Database(inner) => match inner {
                RepositoryError::NotFound => ErrorBody {
                    error: "not_found",
                    message: "Not found".to_string(),
                    field: None,
                    date: None,
                },
                RepositoryError::IllegalTransition { from, to } => ErrorBody {
                    error: "illegal_transition",
                    message: format!("Cannot move from {from} to {to}"),
                    field: None,
                    date: None,
                },
                RepositoryError::Conflict(message) => ErrorBody {
                    error: "conflict",
                    message: message.clone(),
                    field: None,
                    date: None,
                },
                RepositoryError::DateConflict(date) => ErrorBody {
                    error: "date_already_reserved",
                    message: "This date is already reserved".to_string(),
                    field: None,
                    date: Some(*date),
                },
                RepositoryError::EmptyOrder => ErrorBody {
                    error: "validation_error",
                    message: "order must contain at least one item".to_string(),
                    field: Some("items"),
                    date: None,
                },
                RepositoryError::Database(_)
                | RepositoryError::DataCorruption(_)
                | RepositoryError::DuplicateOrderNumber(_) => ErrorBody {
                    error: "internal_error",
                    message: "Internal server error".to_string(),
                    field: None,
                    date: None,
                },
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (self.status(), Json(self.body())).into_response()
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Validation { field, message } => Self::Validation { field, message },
            // An unpriceable cart is a request problem, not a server fault.
            CheckoutError::Pricing(e) => Self::Validation {
                field: "items",
                message: e.to_string(),
            },
            CheckoutError::Repository(e) => Self::Database(e),
            CheckoutError::Gateway(e) => Self::Payment(e),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation { field, message } => Self::Validation { field, message },
            BookingError::Repository(RepositoryError::DateConflict(date)) => {
                Self::DateConflict(date)
            }
            BookingError::Repository(e) => Self::Database(e),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
