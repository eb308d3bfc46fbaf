// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Resolves the `Authorization` header of a request into an outcome.
//!
//! Resolution never fails: a missing header is [`AuthenticationOutcome::Absent`]
//! and a bad or expired token is [`AuthenticationOutcome::Rejected`]. Deciding
//! whether a route needs a principal is left to the extractors.

use super::claims::Principal;
use super::manager::{TokenManager, TokenStatus};

/// Scheme prefix expected in the `Authorization` header. Case-sensitive.
pub const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Expired,
    Invalid(String),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Expired => f.write_str("token expired"),
            RejectReason::Invalid(reason) => write!(f, "token invalid: {reason}"),
        }
    }
}

/// Per-request authentication result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationOutcome {
    Authenticated(Principal),
    /// No bearer credential was presented
    Absent,
    Rejected(RejectReason),
}

impl AuthenticationOutcome {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AuthenticationOutcome::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }

    pub fn into_principal(self) -> Option<Principal> {
        match self {
            AuthenticationOutcome::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthenticationOutcome::Authenticated(_))
    }
}

/// Resolve a raw `Authorization` header value.
pub fn resolve(manager: &TokenManager, header: Option<&str>) -> AuthenticationOutcome {
    let Some(token) = header.and_then(|value| value.strip_prefix(BEARER_PREFIX)) else {
        return AuthenticationOutcome::Absent;
    };

    match manager.inspect(token) {
        TokenStatus::Valid(claims) => {
            AuthenticationOutcome::Authenticated(Principal::from_claims(claims))
        }
        TokenStatus::Expired(claims) => {
            tracing::warn!(sub = %claims.sub, exp = claims.exp, "Rejected expired token");
            AuthenticationOutcome::Rejected(RejectReason::Expired)
        }
        TokenStatus::Malformed(e) => {
            tracing::warn!(error = %e, "Rejected invalid token");
            AuthenticationOutcome::Rejected(RejectReason::Invalid(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::keys::tests::{PRIMARY_PRIVATE, PRIMARY_PUBLIC};
    use crate::config::JwtConfig;
    use chrono::{Duration, Utc};

    fn manager() -> TokenManager {
        TokenManager::new(&JwtConfig {
            issuer: "tokengate-test".to_string(),
            private_key: PRIMARY_PRIVATE.to_string(),
            public_key: PRIMARY_PUBLIC.to_string(),
            access_token_validity_ms: 60_000,
            refresh_token_validity_ms: 120_000,
        })
        .unwrap()
    }

    #[test]
    fn missing_header_is_absent() {
        assert_eq!(resolve(&manager(), None), AuthenticationOutcome::Absent);
    }

    #[test]
    fn other_schemes_are_absent() {
        let manager = manager();
        assert_eq!(
            resolve(&manager, Some("Basic dXNlcjpwYXNz")),
            AuthenticationOutcome::Absent
        );
        // Prefix match is exact
        assert_eq!(resolve(&manager, Some("bearer abc")), AuthenticationOutcome::Absent);
        assert_eq!(resolve(&manager, Some("Bearer")), AuthenticationOutcome::Absent);
    }

    #[test]
    fn valid_token_authenticates_with_authorities() {
        let manager = manager();
        let pair = manager
            .issue_for("admin@example.com", Some("ROLE_ADMIN"), 60_000, 120_000)
            .unwrap();

        let outcome = resolve(&manager, Some(&format!("Bearer {}", pair.access_token)));
        let principal = outcome.principal().expect("authenticated");
        assert_eq!(principal.username(), "admin@example.com");
        assert!(principal.has_role("ADMIN"));
    }

    #[test]
    fn token_without_authorities_has_empty_set() {
        let manager = manager();
        let pair = manager.issue("dev@example.com").unwrap();

        let outcome = resolve(&manager, Some(&format!("Bearer {}", pair.access_token)));
        assert!(outcome.is_authenticated());
        assert!(outcome.into_principal().unwrap().authorities.is_empty());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let outcome = resolve(&manager(), Some("Bearer garbage"));
        assert!(matches!(
            outcome,
            AuthenticationOutcome::Rejected(RejectReason::Invalid(_))
        ));
        assert!(outcome.principal().is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let manager = manager();
        let past = Utc::now() - Duration::hours(1);
        let pair = manager
            .issue_at("dev@example.com", None, 1_000, 2_000, past)
            .unwrap();

        let outcome = resolve(&manager, Some(&format!("Bearer {}", pair.access_token)));
        assert_eq!(outcome, AuthenticationOutcome::Rejected(RejectReason::Expired));
    }
}
