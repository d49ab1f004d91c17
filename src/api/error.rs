use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use std::fmt;

use super::ApiResponse;
use crate::services::{ArtistError, AuthError, WorkError};
use crate::validation::{FieldErrors, ValidationError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    /// Field errors, plus the form's reference data when it has any.
    Validation {
        errors: FieldErrors,
        props: Option<serde_json::Value>,
    },

    BadRequest(String),

    PayloadTooLarge(String),

    /// No session or API key; answered with a redirect to the login page.
    Unauthenticated,

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Validation { errors, .. } => {
                write!(f, "Validation failed for {} field(s)", errors.len())
            }
            Self::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            Self::PayloadTooLarge(msg) => write!(f, "Payload too large: {msg}"),
            Self::Unauthenticated => write!(f, "Unauthenticated"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct ValidationBody {
    message: &'static str,
    errors: FieldErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    props: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            Self::Validation { errors, props } => {
                let body = ValidationBody {
                    message: "The given data was invalid.",
                    errors,
                    props,
                };
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
            }
            Self::Unauthenticated => {
                let mut response = Redirect::to("/login").into_response();
                response
                    .headers_mut()
                    .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
                return response;
            }
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(format!("{err:#}"))
    }
}

impl From<ArtistError> for ApiError {
    fn from(err: ArtistError) -> Self {
        match err {
            ArtistError::NotFound(id) => Self::not_found("Artist", id),
            ArtistError::Validation(errors) => Self::validation(errors),
            ArtistError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<WorkError> for ApiError {
    fn from(err: WorkError) -> Self {
        match err {
            WorkError::NotFound(id) => Self::not_found("Work", id),
            WorkError::Validation(errors) => Self::validation(errors),
            WorkError::Storage(msg) => Self::InternalError(format!("Storage failure: {msg}")),
            WorkError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Fields(errors) => Self::validation(errors),
            ValidationError::Lookup(e) => Self::from(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                let mut errors = FieldErrors::new();
                errors.add("username", "These credentials do not match our records.");
                Self::validation(errors)
            }
            AuthError::Validation(msg) => Self::BadRequest(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    #[must_use]
    pub const fn validation(errors: FieldErrors) -> Self {
        Self::Validation {
            errors,
            props: None,
        }
    }

    /// Attaches the form's reference data to a validation failure.
    #[must_use]
    pub fn with_props(self, value: serde_json::Value) -> Self {
        match self {
            Self::Validation { errors, .. } => Self::Validation {
                errors,
                props: Some(value),
            },
            other => other,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}
