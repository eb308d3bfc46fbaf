// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token and authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ErrorResponse;

/// Errors from encoding, decoding and issuing tokens.
///
/// `Malformed`, `InvalidSignature` and `InvalidAlgorithm` make up the
/// "token invalid" family: they are always recoverable and end up as an
/// authentication rejection, never as a server error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token algorithm is not RS256")]
    InvalidAlgorithm,

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("token validity must be positive (got {0} ms)")]
    InvalidValidity(i64),
}

impl TokenError {
    /// True for the errors a presented token can cause.
    pub fn is_invalid_token(&self) -> bool {
        matches!(
            self,
            TokenError::Malformed(_) | TokenError::InvalidSignature | TokenError::InvalidAlgorithm
        )
    }
}

/// Access-control failures raised after authentication has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No authenticated principal on a route that requires one
    #[error("Full authentication is required to access this resource")]
    CredentialsNotFound,

    /// Authenticated, but missing a required authority
    #[error("Access Denied")]
    AccessDenied,
}

impl AuthError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::CredentialsNotFound => StatusCode::UNAUTHORIZED,
            AuthError::AccessDenied => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::debug!(status = status.as_u16(), error = %self, "Security error response");

        let body = ErrorResponse::failure(None, None, Some(self.to_string()));
        (status, Json(body)).into_response()
    }
}
