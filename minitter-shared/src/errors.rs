use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{domain}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: User errors
/// - E2xxx: Tweet errors
/// - E3xxx: Follow errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    ServiceUnavailable,
    NotImplemented,
    Conflict,
    ConstraintViolation,

    // User (E1xxx)
    EmailAlreadyExists,
    UserNotFound,
    UnknownUser,

    // Tweet (E2xxx)
    TweetTooLong,

    // Follow (E3xxx)
    CannotFollowSelf,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::ServiceUnavailable => "E0004",
            Self::NotImplemented => "E0005",
            Self::Conflict => "E0006",
            Self::ConstraintViolation => "E0007",

            // User
            Self::EmailAlreadyExists => "E1001",
            Self::UserNotFound => "E1002",
            Self::UnknownUser => "E1003",

            // Tweet
            Self::TweetTooLong => "E2001",

            // Follow
            Self::CannotFollowSelf => "E3001",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::ServiceUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Self::ValidationError | Self::ConstraintViolation | Self::UnknownUser
            | Self::TweetTooLong | Self::CannotFollowSelf => StatusCode::BAD_REQUEST,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Conflict | Self::EmailAlreadyExists => StatusCode::CONFLICT,
        }
    }
}

/// Failures reported by the data-access layer.
///
/// Constraint failures are classified from the database error kind so the
/// endpoint layer can pick a status without inspecting store text.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store error: {0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(kind, info) => {
                let constraint = info
                    .constraint_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| info.message().to_string());
                match kind {
                    DatabaseErrorKind::UniqueViolation => Self::UniqueViolation(constraint),
                    DatabaseErrorKind::ForeignKeyViolation => Self::ForeignKeyViolation(constraint),
                    DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand => {
                        Self::Unavailable(info.message().to_string())
                    }
                    _ => Self::Internal(info.message().to_string()),
                }
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for StoreError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Status this error will be rendered with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Known { code, .. } => code.status_code(),
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Store(err) => match err {
                StoreError::UniqueViolation(_) => StatusCode::CONFLICT,
                StoreError::ForeignKeyViolation(_) => StatusCode::BAD_REQUEST,
                StoreError::Unavailable(_) | StoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        match serde_json::to_value(&errors) {
            Ok(details) => Self::with_details(ErrorCode::ValidationError, "invalid request body", details),
            Err(_) => Self::Validation(errors.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = match &self {
            AppError::Known { code, message, details } => {
                if status.is_server_error() {
                    tracing::error!(code = code.code(), error = %message, "request failed");
                }
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                resp
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                ApiErrorResponse::new(ErrorCode::InternalError.code(), "internal server error")
            }
            AppError::Store(err) => match err {
                StoreError::UniqueViolation(constraint) => {
                    tracing::debug!(constraint = %constraint, "unique violation");
                    ApiErrorResponse::new(ErrorCode::Conflict.code(), "resource already exists")
                }
                StoreError::ForeignKeyViolation(constraint) => {
                    tracing::debug!(constraint = %constraint, "foreign key violation");
                    ApiErrorResponse::new(
                        ErrorCode::ConstraintViolation.code(),
                        "referenced resource does not exist",
                    )
                }
                StoreError::Unavailable(reason) => {
                    tracing::error!(error = %reason, "database unavailable");
                    ApiErrorResponse::new(ErrorCode::ServiceUnavailable.code(), "service unavailable")
                }
                StoreError::Internal(reason) => {
                    tracing::error!(error = %reason, "database error");
                    ApiErrorResponse::new(ErrorCode::InternalError.code(), "database error")
                }
            },
            AppError::Validation(msg) => ApiErrorResponse::new(ErrorCode::ValidationError.code(), msg),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
