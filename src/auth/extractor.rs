// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated principals.
//!
//! These read the [`Principal`] that the `authenticate` middleware placed in
//! the request extensions; they never look at the token themselves.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal.username() is the token subject
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::authority::ADMIN_ROLE;
use super::claims::Principal;
use super::error::AuthError;

/// Requires an authenticated principal; rejects with 401 otherwise.
pub struct Auth(pub Principal);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::CredentialsNotFound)
    }
}

/// Requires the `ROLE_ADMIN` authority; 401 when anonymous, 403 otherwise.
pub struct AdminOnly(pub Principal);

impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(principal) = Auth::from_request_parts(parts, state).await?;

        if !principal.has_role(ADMIN_ROLE) {
            tracing::warn!(principal = %principal.username(), "Admin role required");
            return Err(AuthError::AccessDenied);
        }

        Ok(AdminOnly(principal))
    }
}

/// Optional authentication extractor.
///
/// Yields `None` for anonymous requests instead of rejecting.
pub struct OptionalAuth(pub Option<Principal>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<Principal>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::Claims;
    use axum::http::Request;

    fn parts_with(principal: Option<Principal>) -> Parts {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        if let Some(principal) = principal {
            parts.extensions.insert(principal);
        }
        parts
    }

    fn principal(authorities: Option<&str>) -> Principal {
        Principal::from_claims(Claims {
            sub: "dev@example.com".to_string(),
            iss: "tokengate-test".to_string(),
            iat: 0,
            exp: i64::MAX,
            authorities: authorities.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn auth_requires_principal() {
        let mut parts = parts_with(None);
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::CredentialsNotFound)));
    }

    #[tokio::test]
    async fn auth_reads_principal_from_extensions() {
        let mut parts = parts_with(Some(principal(None)));
        let Auth(found) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found.username(), "dev@example.com");
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let mut parts = parts_with(Some(principal(Some("ROLE_USER"))));
        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::AccessDenied)));
    }

    #[tokio::test]
    async fn admin_only_rejects_anonymous_with_401() {
        let mut parts = parts_with(None);
        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::CredentialsNotFound)));
    }

    #[tokio::test]
    async fn admin_only_accepts_admin() {
        let mut parts = parts_with(Some(principal(Some("ROLE_USER,ROLE_ADMIN"))));
        assert!(AdminOnly::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn optional_auth_returns_none_without_principal() {
        let mut parts = parts_with(None);
        let OptionalAuth(found) = OptionalAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(found.is_none());
    }
}
