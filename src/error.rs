// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Error Translation
//!
//! Every handler failure is an [`ApiError`]. Before it becomes a response it
//! is classified by [`ApiError::translate`], which picks the HTTP status, the
//! [`ErrorCode`] and the log severity. Rules are applied in order and the
//! first match wins:
//!
//! | # | Condition | Status | Code |
//! |---|-----------|--------|------|
//! | 1 | No route matched | 404 | none |
//! | 2 | [`ApiError::Validation`] | 400 | `VALIDATION_FAILED` |
//! | 3 | Binding failure with reason `Validation failure` | 400 | `VALIDATION_FAILED` |
//! | 4 | Body decoding hit an unknown enum variant or a blank value | 400 | `VALIDATION_FAILED` |
//! | 5 | Anything else | carried or 500 | `EXCEPTION` |
//!
//! `EXCEPTION` is logged at error level with the full error chain and is the
//! only case whose raw text is returned in `errorMessage`. Everything else is
//! logged at warn level.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, Request,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, FixedOffset};
use serde::{de::DeserializeOwned, Serialize};

use crate::auth::TokenError;
use crate::models::response_timestamp;

/// Reason attached to binding failures raised by field validation.
pub const VALIDATION_FAILURE_REASON: &str = "Validation failure";

/// Fragment of serde's message for a value outside an enum's variants.
const UNKNOWN_VARIANT: &str = "unknown variant";

/// Error codes returned in the envelope's `errorCode` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request parameters failed validation
    ValidationFailed,
    /// Failure that has not been classified
    NotClassified,
    /// Unexpected failure
    Exception,
}

/// Uniform JSON error envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub timestamp: DateTime<FixedOffset>,
    pub message: Option<String>,
    pub error_code: Option<ErrorCode>,
    pub error_message: Option<String>,
}

impl ErrorResponse {
    pub fn failure(
        message: Option<String>,
        error_code: Option<ErrorCode>,
        error_message: Option<String>,
    ) -> Self {
        Self {
            success: false,
            timestamp: response_timestamp(),
            message,
            error_code,
            error_message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
}

/// Outcome of classifying an [`ApiError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub status: StatusCode,
    pub code: Option<ErrorCode>,
    pub message: Option<String>,
    pub error_message: Option<String>,
    pub severity: Severity,
}

impl Translation {
    fn validation_failed(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: Some(ErrorCode::ValidationFailed),
            message: Some(message.to_string()),
            error_message: None,
            severity: Severity::Warn,
        }
    }

    pub fn body(&self) -> ErrorResponse {
        ErrorResponse::failure(self.message.clone(), self.code, self.error_message.clone())
    }
}

/// Failure type returned by handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No route found")]
    RouteNotFound,

    /// Business-level validation failure raised by a handler
    #[error("{0}")]
    Validation(String),

    /// Request could not be bound to its target type
    #[error("{reason}: {message}")]
    Binding {
        status: StatusCode,
        reason: String,
        message: String,
    },

    /// Request body could not be decoded
    #[error("{message}")]
    Decoding {
        status: StatusCode,
        message: String,
        /// Offending input value, when the decoder reported one
        invalid_value: Option<String>,
    },

    #[error("{1}")]
    Status(StatusCode, String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::Status(status, message.into())
    }

    /// Status the failure carries before classification.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Binding { status, .. }
            | ApiError::Decoding { status, .. }
            | ApiError::Status(status, _) => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify this failure. See the module docs for the rules.
    pub fn translate(&self) -> Translation {
        match self {
            ApiError::RouteNotFound => Translation {
                status: StatusCode::NOT_FOUND,
                code: None,
                message: None,
                error_message: None,
                severity: Severity::Warn,
            },
            ApiError::Validation(message) => Translation::validation_failed(message),
            ApiError::Binding {
                reason, message, ..
            } if reason == VALIDATION_FAILURE_REASON => Translation::validation_failed(message),
            ApiError::Decoding {
                message,
                invalid_value,
                ..
            } if message.contains(UNKNOWN_VARIANT)
                || invalid_value.as_deref().is_some_and(|v| v.trim().is_empty()) =>
            {
                Translation::validation_failed(message)
            }
            other => Translation {
                status: other.status_code(),
                code: Some(ErrorCode::Exception),
                message: None,
                error_message: Some(other.to_string()),
                severity: Severity::Error,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let translation = self.translate();
        let status = translation.status.as_u16();

        match translation.severity {
            Severity::Error => tracing::error!(status, error = ?self, "Request failed"),
            Severity::Warn => tracing::warn!(status, error = %self, "Request rejected"),
        }

        (translation.status, Json(translation.body())).into_response()
    }
}

impl From<TokenError> for ApiError {
    fn from(error: TokenError) -> Self {
        ApiError::Internal(anyhow::Error::new(error))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = rejection.status();
        let message = rejection.body_text();

        match rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                ApiError::Decoding {
                    status,
                    invalid_value: offending_value(&message),
                    message,
                }
            }
            _ => ApiError::Binding {
                status,
                reason: status.canonical_reason().unwrap_or("Bad Request").to_string(),
                message,
            },
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        let status = rejection.status();
        ApiError::Binding {
            status,
            reason: status.canonical_reason().unwrap_or("Bad Request").to_string(),
            message: rejection.body_text(),
        }
    }
}

/// Pull the quoted input out of serde messages such as
/// `invalid value: string "", expected ...`.
fn offending_value(message: &str) -> Option<String> {
    const MARKER: &str = "string \"";
    let start = message.find(MARKER)? + MARKER.len();
    let end = message[start..].find('"')?;
    Some(message[start..start + end].to_string())
}

/// Field validation for request bodies.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Collected field errors for one request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Binding {
            status: StatusCode::BAD_REQUEST,
            reason: VALIDATION_FAILURE_REASON.to_string(),
            message: errors.to_string(),
        }
    }
}

/// JSON body extractor that runs [`Validate`] after decoding.
///
/// Decoding failures and validation failures both come back as [`ApiError`]
/// so they go through the same translation.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
