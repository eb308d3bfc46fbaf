// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies used by the HTTP API. Successful responses
//! share the envelope fields in [`ResponseMeta`] (`success`, `timestamp`,
//! optional `message`); failures use [`crate::error::ErrorResponse`].
//!
//! Timestamps are serialized as ISO-8601 with the server's local offset.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};

use crate::auth::{Authority, Claims, Principal, TokenPair};
use crate::error::{FieldErrors, Validate};

/// Current time in the local offset, as used in response envelopes.
pub fn response_timestamp() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

// =============================================================================
// Envelope
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ResponseMeta {
    pub success: bool,
    pub timestamp: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResponseMeta {
    pub fn ok() -> Self {
        Self {
            success: true,
            timestamp: response_timestamp(),
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok()
        }
    }
}

// =============================================================================
// Index
// =============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct IndexQuery {
    #[serde(default)]
    pub show_headers: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<String>,
    /// First value of each request header, sorted by name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_headers: Option<BTreeMap<String, String>>,
}

// =============================================================================
// Tokens
// =============================================================================

/// Body of `PATCH /p/example/jwt-generate`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateTokenRequest {
    /// Becomes the `sub` claim; must look like an email address
    pub username: String,
    /// Optional role names or authorities, e.g. `["ADMIN"]` or `["ROLE_ADMIN"]`
    #[serde(default)]
    pub authorities: Vec<String>,
}

impl GenerateTokenRequest {
    /// Authorities in claim form with the `ROLE_` prefix applied.
    pub fn authority_claim(&self) -> Option<String> {
        let authorities: Vec<Authority> = self
            .authorities
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(Authority::role)
            .collect();
        if authorities.is_empty() {
            None
        } else {
            Some(Authority::join(&authorities))
        }
    }
}

impl Validate for GenerateTokenRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.username.trim().is_empty() {
            errors.add("username", "must not be blank");
        } else if !is_email_shaped(&self.username) {
            errors.add("username", "must be a well-formed email address");
        }
        if self.authorities.iter().any(|a| a.contains(',')) {
            errors.add("authorities", "must not contain commas");
        }
        errors.into_result()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTokenResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    pub jwt_token: TokenPair,
}

/// Claims of the token used to call `PATCH /example/jwt-auth`.
#[derive(Debug, Serialize)]
pub struct ClaimsResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    pub claims: Claims,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    pub username: String,
    pub authorities: Vec<Authority>,
}

impl From<Principal> for WhoAmIResponse {
    fn from(principal: Principal) -> Self {
        Self {
            meta: ResponseMeta::ok(),
            username: principal.claims.sub,
            authorities: principal.authorities,
        }
    }
}

/// Loose email shape check: `local@domain.tld`, no whitespace.
pub fn is_email_shaped(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}
