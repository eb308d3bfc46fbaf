// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RS256 compact token encoding and verification.
//!
//! Decoding verifies the signature and the payload structure only. Time
//! based checks (`exp`, `nbf`) are left to the token manager so that parsing
//! and validating stay separate operations.

use jsonwebtoken::{errors::ErrorKind, Algorithm, Header, Validation};

use super::claims::Claims;
use super::error::TokenError;
use super::keys::KeyPair;

/// The only signing algorithm issued and accepted.
pub const ALGORITHM: Algorithm = Algorithm::RS256;

/// Sign `claims` with the private half of `keys`.
pub fn encode(claims: &Claims, keys: &KeyPair) -> Result<String, TokenError> {
    jsonwebtoken::encode(&Header::new(ALGORITHM), claims, keys.encoding_key())
        .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Verify `token` with the public half of `keys` and return its claims.
///
/// Does not look at `exp`: an expired but correctly signed token decodes.
pub fn decode(token: &str, keys: &KeyPair) -> Result<Claims, TokenError> {
    jsonwebtoken::decode::<Claims>(token, keys.decoding_key(), &signature_only())
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm => TokenError::InvalidAlgorithm,
            _ => TokenError::Malformed(e.to_string()),
        })
}

fn signature_only() -> Validation {
    let mut validation = Validation::new(ALGORITHM);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}
