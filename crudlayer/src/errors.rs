//! # HTTP errors
//!
//! [`ApiError`] turns a [`CrudError`] into a response with a sanitized
//! [`CrudErrorBody`]. Expected errors (not found, conflicts, bad input) carry
//! their message to the client. Everything else is logged with `tracing` and
//! answered with a fixed `500` message, so database details never leak.
//!
//! ```rust,ignore
//! async fn handler() -> Result<Json<FooDto>, ApiError> {
//!     let foo = service.get(&id, &parameters).await?
//!         .ok_or_else(|| CrudError::not_found("Foo", &id))?;
//!     Ok(Json(foo.into()))
//! }
//! ```

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::core::CrudError;
use crate::validation::ValidationError;

/// Message of every `500 Internal Server Error` response.
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred!";

/// Error type returned by the CRUD handlers.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request
    BadRequest { message: String },

    /// 404 Not Found
    NotFound { message: String },

    /// 409 Conflict
    Conflict { message: String },

    /// 422 Unprocessable Entity
    ValidationFailed { errors: Vec<ValidationError> },

    /// 500 Internal Server Error, details are logged and never sent
    Internal { internal: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn validation_failed(errors: Vec<ValidationError>) -> Self {
        Self::ValidationFailed { errors }
    }

    pub fn internal(internal: impl Into<String>) -> Self {
        Self::Internal {
            internal: internal.into(),
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent to the client.
    fn user_message(&self) -> String {
        match self {
            Self::BadRequest { message } | Self::NotFound { message } | Self::Conflict { message } => {
                message.clone()
            }
            Self::ValidationFailed { errors } => format!(
                "Validation failed: {}",
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::Internal { .. } => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Internal { internal } => {
                tracing::error!(details = %internal, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }

    #[must_use]
    pub fn body(&self) -> CrudErrorBody {
        let status = self.status_code();
        CrudErrorBody {
            code: status.as_u16(),
            message: self.user_message(),
            kind: status.canonical_reason().unwrap_or_default().to_string(),
            details: match self {
                Self::ValidationFailed { errors } => Some(errors.clone()),
                _ => None,
            },
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CrudErrorBody {
    /// HTTP status code
    #[schema(example = 404)]
    pub code: u16,
    /// Human readable description
    #[schema(example = "Foo with id 42 is not found.")]
    pub message: String,
    /// HTTP reason phrase
    #[serde(rename = "type")]
    #[schema(example = "Not Found")]
    pub kind: String,
    /// Failed field checks, only present on validation errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();
        (self.status_code(), Json(self.body())).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

impl From<CrudError> for ApiError {
    fn from(err: CrudError) -> Self {
        match err {
            CrudError::NotFound { .. } => Self::not_found(err.to_string()),
            CrudError::AlreadyExists { .. } => Self::conflict(err.to_string()),
            CrudError::InvalidInput(message) => Self::bad_request(message),
            CrudError::Validation(errors) => Self::validation_failed(errors),
            CrudError::ConcurrencyInvariantViolation { .. } | CrudError::Store(_) => {
                Self::internal(err.to_string())
            }
        }
    }
}

/// A request body that could not be read as the expected JSON.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Request body is not valid: {}", rejection.body_text()))
    }
}
