// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Protected example endpoints.

use axum::Json;

use crate::auth::{AdminOnly, Auth};
use crate::models::{ClaimsResponse, ResponseMeta, WhoAmIResponse};

/// Echo the caller's claims. Requires `ROLE_ADMIN`.
pub async fn jwt_auth(AdminOnly(principal): AdminOnly) -> Json<ClaimsResponse> {
    Json(ClaimsResponse {
        meta: ResponseMeta::ok(),
        claims: principal.claims,
    })
}

/// Identity of the authenticated caller.
pub async fn whoami(Auth(principal): Auth) -> Json<WhoAmIResponse> {
    Json(principal.into())
}
