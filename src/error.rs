//! Service error types with HTTP status code mapping.
//!
//! [`BookingError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2101,
///     "message": "slot already booked: 2024-01-01 10:00:00-11:00:00",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see the code ranges on [`BookingError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category         | HTTP Status                  |
/// |-----------|------------------|------------------------------|
/// | 1000–1999 | Validation       | 400 Bad Request              |
/// | 2000–2099 | Not Found        | 404 Not Found                |
/// | 2100–2199 | Conflict         | 409 Conflict                 |
/// | 3000–3999 | Server           | 500 Internal Server Error    |
/// | 4000–4999 | Access           | 401 Unauthorized / 403       |
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Request validation failed (malformed or missing booking fields).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Sport with the given ID was not found.
    #[error("sport not found: {0}")]
    SportNotFound(uuid::Uuid),

    /// Booking with the given ID was not found (or is not visible to the
    /// requester).
    #[error("booking not found: {0}")]
    BookingNotFound(uuid::Uuid),

    /// Player with the given ID was not found.
    #[error("player not found: {0}")]
    PlayerNotFound(uuid::Uuid),

    /// The requested window intersects a confirmed booking.
    #[error("slot already booked: {date} {start}-{end}")]
    SlotOverlap {
        /// Requested date.
        date: NaiveDate,
        /// Requested start time.
        start: NaiveTime,
        /// Requested end time.
        end: NaiveTime,
    },

    /// A unique username could not be allocated.
    #[error("identity conflict: {0}")]
    IdentityConflict(String),

    /// A single username insert lost against the unique constraint.
    ///
    /// Identity provisioning resolves this by trying the next suffix.
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// Missing, expired, or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Authenticated but not allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BookingError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::SportNotFound(_) => 2001,
            Self::BookingNotFound(_) => 2002,
            Self::PlayerNotFound(_) => 2003,
            Self::SlotOverlap { .. } => 2101,
            Self::IdentityConflict(_) => 2102,
            Self::UsernameTaken(_) => 2103,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::Unauthorized => 4010,
            Self::Forbidden(_) => 4030,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::SportNotFound(_) | Self::BookingNotFound(_) | Self::PlayerNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::SlotOverlap { .. } | Self::IdentityConflict(_) | Self::UsernameTaken(_) => {
                StatusCode::CONFLICT
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
