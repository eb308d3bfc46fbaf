// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Runs the resolver once per request and publishes the result in the
//! request extensions:
//!
//! - [`AuthenticationOutcome`] is always inserted
//! - [`Principal`](super::claims::Principal) is inserted only when authentication succeeded
//!
//! The middleware never rejects a request. Routes that need a principal use
//! the extractors in `extractor.rs`, which turn a missing principal into 401.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/protected", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), authenticate));
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use super::resolver::{self, AuthenticationOutcome};
use crate::state::AppState;

/// Span field that receives the authenticated username.
pub const PRINCIPAL_FIELD: &str = "principal";

/// Resolve the bearer token and attach the outcome to the request.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Non-ASCII header values count as no credential
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let outcome = resolver::resolve(&state.token_manager, header);

    if let Some(principal) = outcome.principal() {
        tracing::Span::current().record(PRINCIPAL_FIELD, principal.username());
        request.extensions_mut().insert(principal.clone());
    }
    request.extensions_mut().insert(outcome);

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::extractor::OptionalAuth;
    use crate::state::tests::test_state;
    use axum::{body::Body, http::StatusCode, routing::get, Extension, Router};
    use tower::ServiceExt;

    async fn describe(Extension(outcome): Extension<AuthenticationOutcome>) -> String {
        match outcome {
            AuthenticationOutcome::Authenticated(p) => format!("authenticated:{}", p.username()),
            AuthenticationOutcome::Absent => "absent".to_string(),
            AuthenticationOutcome::Rejected(_) => "rejected".to_string(),
        }
    }

    async fn principal_present(OptionalAuth(principal): OptionalAuth) -> String {
        principal.is_some().to_string()
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/outcome", get(describe))
            .route("/principal", get(principal_present))
            .layer(axum::middleware::from_fn_with_state(state.clone(), authenticate))
            .with_state(state)
    }

    async fn call(app: Router, uri: &str, authorization: Option<&str>) -> String {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn anonymous_requests_pass_through() {
        let state = test_state();
        assert_eq!(call(app(state.clone()), "/outcome", None).await, "absent");
        assert_eq!(call(app(state), "/principal", None).await, "false");
    }

    #[tokio::test]
    async fn valid_token_attaches_principal() {
        let state = test_state();
        let pair = state.token_manager.issue("dev@example.com").unwrap();
        let header = format!("Bearer {}", pair.access_token);

        assert_eq!(
            call(app(state.clone()), "/outcome", Some(&header)).await,
            "authenticated:dev@example.com"
        );
        assert_eq!(call(app(state), "/principal", Some(&header)).await, "true");
    }

    #[tokio::test]
    async fn bad_token_is_rejected_but_request_continues() {
        let state = test_state();
        assert_eq!(
            call(app(state.clone()), "/outcome", Some("Bearer nope")).await,
            "rejected"
        );
        assert_eq!(call(app(state), "/principal", Some("Bearer nope")).await, "false");
    }
}
