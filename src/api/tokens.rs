// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance endpoint.

use axum::{extract::State, Json};

use crate::error::{ApiError, ValidatedJson};
use crate::models::{GenerateTokenRequest, GenerateTokenResponse, ResponseMeta};
use crate::state::AppState;

/// Issue an access/refresh token pair for `username`.
///
/// Public. Uses the configured default validities.
pub async fn generate(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<GenerateTokenRequest>,
) -> Result<Json<GenerateTokenResponse>, ApiError> {
    let authorities = request.authority_claim();
    let pair = state
        .token_manager
        .issue_with_authorities(&request.username, authorities.as_deref())?;

    tracing::info!(
        username = %request.username,
        authorities = authorities.as_deref().unwrap_or(""),
        expires_at = %pair.access_token_expires_at,
        "Issued token pair"
    );

    Ok(Json(GenerateTokenResponse {
        meta: ResponseMeta::ok(),
        jwt_token: pair,
    }))
}
