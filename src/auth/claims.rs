// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and the authenticated principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::authority::Authority;

/// Claims carried by every issued token.
///
/// `iat` and `exp` are JWT NumericDate values (seconds since the epoch).
/// Access and refresh tokens share the same claim base; only `exp` differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// Comma-separated authority list, e.g. `ROLE_USER,ROLE_ADMIN`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorities: Option<String>,
}

impl Claims {
    /// Parse the `authorities` claim.
    ///
    /// Entries are trimmed and empty entries dropped; a missing claim yields
    /// an empty list.
    pub fn authority_list(&self) -> Vec<Authority> {
        self.authorities
            .as_deref()
            .map(Authority::parse_list)
            .unwrap_or_default()
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Whether `now` is strictly before the expiration instant.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| now < exp)
    }
}

/// Identity resolved from a verified bearer token.
///
/// Lives for one request: created by the resolver, stored in the request
/// extensions, read by extractors and handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub claims: Claims,
    pub authorities: Vec<Authority>,
}

impl Principal {
    pub fn from_claims(claims: Claims) -> Self {
        let authorities = claims.authority_list();
        Self {
            claims,
            authorities,
        }
    }

    pub fn username(&self) -> &str {
        &self.claims.sub
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a.as_str() == authority)
    }

    /// Role check with the `ROLE_` prefix applied, so `has_role("ADMIN")`
    /// matches the `ROLE_ADMIN` authority.
    pub fn has_role(&self, role: &str) -> bool {
        self.authorities.iter().any(|a| a.is_role(role))
    }
}
