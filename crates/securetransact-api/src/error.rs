use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, error};

use securetransact_db::{DbErrorKind, classify};
use securetransact_types::api::RegisterDetails;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("required registration fields are missing")]
    MissingFields(RegisterDetails),

    #[error("invalid request body: {0}")]
    BadBody(String),

    #[error("invalid {0} id")]
    BadId(&'static str),

    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already registered")]
    EmailTaken,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database unavailable")]
    DatabaseUnavailable,

    #[error("database error ({}): {source:#}", .kind.code())]
    Database {
        kind: DbErrorKind,
        source: anyhow::Error,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<anyhow::Error> for ApiError {
    fn from(source: anyhow::Error) -> Self {
        ApiError::Database {
            kind: classify(&source),
            source,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::MissingFields(_)
            | Self::BadBody(_)
            | Self::BadId(_)
            | Self::EmailTaken => StatusCode::BAD_REQUEST,
            Self::MissingToken | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::InvalidToken | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DatabaseUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database { kind, .. } => match kind {
                DbErrorKind::ForeignKeyViolation | DbErrorKind::CheckViolation => {
                    StatusCode::BAD_REQUEST
                }
                DbErrorKind::UniqueViolation => StatusCode::CONFLICT,
                DbErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                DbErrorKind::MissingTable | DbErrorKind::Other => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Validation(msg) => json!({ "success": false, "error": msg }),
            Self::MissingFields(details) => json!({
                "success": false,
                "error": "All required fields must be filled in",
                "details": details,
            }),
            Self::BadBody(reason) => json!({
                "success": false,
                "error": "Invalid request body",
                "details": reason,
            }),
            Self::BadId(what) => json!({ "success": false, "error": format!("Invalid {} id", what) }),
            Self::MissingToken => json!({ "success": false, "error": "Authentication required" }),
            Self::InvalidToken => json!({ "success": false, "error": "Invalid or expired token" }),
            Self::InvalidCredentials => {
                json!({ "success": false, "error": "Invalid email or password" })
            }
            Self::EmailTaken => json!({
                "success": false,
                "error": "An account with this email already exists",
                "suggestion": "Use another email or sign in",
            }),
            Self::Forbidden(msg) => json!({ "success": false, "error": msg }),
            Self::NotFound(what) => json!({ "success": false, "error": format!("{} not found", what) }),
            Self::DatabaseUnavailable => json!({
                "success": false,
                "error": "Service temporarily unavailable",
                "details": "Database unavailable. Please try again later.",
                "suggestion": "Check that the database is configured and reachable",
            }),
            Self::Database { kind, .. } => {
                let (error, suggestion) = match kind {
                    DbErrorKind::UniqueViolation => (
                        "A record with this value already exists",
                        "Use a different value",
                    ),
                    DbErrorKind::ForeignKeyViolation => (
                        "Referenced record does not exist",
                        "Check the ids in the request",
                    ),
                    DbErrorKind::CheckViolation => (
                        "Value outside the allowed set",
                        "Check the enumerated fields in the request",
                    ),
                    DbErrorKind::MissingTable => (
                        "Database not initialized",
                        "Contact the system administrator",
                    ),
                    DbErrorKind::Unavailable => (
                        "Database unavailable",
                        "Check that the database is reachable",
                    ),
                    DbErrorKind::Other => ("Server error", "Please try again later"),
                };
                json!({
                    "success": false,
                    "error": error,
                    "suggestion": suggestion,
                    "code": kind.code(),
                })
            }
            Self::Internal(_) => json!({
                "success": false,
                "error": "Server error",
                "suggestion": "Please try again later",
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            debug!("Request rejected ({}): {}", status, self);
        }
        (status, Json(self.body())).into_response()
    }
}
