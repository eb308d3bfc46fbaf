// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Token Manager
//!
//! Issues access/refresh token pairs and answers questions about presented
//! tokens. The manager owns the active [`KeyPair`] and the issuance settings.
//!
//! ## Key rotation
//!
//! Keys and settings live together in one immutable snapshot behind an
//! [`ArcSwap`]. Every operation loads the snapshot once, so a concurrent
//! [`TokenManager::reload`] is observed either entirely or not at all.
//!
//! ## Timestamps
//!
//! `iat` is the issuance instant truncated to whole seconds. The expiry
//! instants reported in [`TokenPair`] are `issued_at + validity` exactly; the
//! signed `exp` claim is that instant rounded up to the next whole second.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Duration, FixedOffset, Local, Utc};
use serde::Serialize;

use super::claims::Claims;
use super::codec;
use super::error::TokenError;
use super::keys::{KeyMaterialError, KeyPair};
use crate::config::JwtConfig;

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub issued_at: DateTime<FixedOffset>,
    pub access_token_expires_at: DateTime<FixedOffset>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<FixedOffset>,
}

/// Result of inspecting a presented token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// Signature verifies and `exp` is in the future
    Valid(Claims),
    /// Signature verifies but `exp` has passed
    Expired(Claims),
    /// Signature, structure or encoding is bad
    Malformed(TokenError),
}

impl TokenStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, TokenStatus::Valid(_))
    }
}

#[derive(Debug, Clone)]
struct Settings {
    issuer: String,
    access_token_validity_ms: i64,
    refresh_token_validity_ms: i64,
}

impl From<&JwtConfig> for Settings {
    fn from(config: &JwtConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            access_token_validity_ms: config.access_token_validity_ms,
            refresh_token_validity_ms: config.refresh_token_validity_ms,
        }
    }
}

#[derive(Debug)]
struct Snapshot {
    keys: KeyPair,
    settings: Settings,
}

/// Issues and verifies RS256 tokens.
///
/// Cheap to share: wrap in an `Arc` and hand out clones.
pub struct TokenManager {
    current: ArcSwap<Snapshot>,
}

impl TokenManager {
    /// Load the configured key pair and build a manager.
    ///
    /// Fails if either key cannot be loaded; there is no keyless manager.
    pub fn new(config: &JwtConfig) -> Result<Self, KeyMaterialError> {
        let keys = KeyPair::load(&config.private_key, &config.public_key)?;
        Ok(Self::with_keys(config, keys))
    }

    /// Build a manager around an already loaded key pair.
    pub fn with_keys(config: &JwtConfig, keys: KeyPair) -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot {
                keys,
                settings: Settings::from(config),
            }),
        }
    }

    /// Issue a pair using the configured default validities.
    pub fn issue(&self, username: &str) -> Result<TokenPair, TokenError> {
        self.issue_with_authorities(username, None)
    }

    /// Issue a pair with an `authorities` claim and the default validities.
    pub fn issue_with_authorities(
        &self,
        username: &str,
        authorities: Option<&str>,
    ) -> Result<TokenPair, TokenError> {
        let snapshot = self.current.load();
        let settings = &snapshot.settings;
        issue_with(
            &snapshot,
            username,
            authorities,
            settings.access_token_validity_ms,
            settings.refresh_token_validity_ms,
            Utc::now(),
        )
    }

    /// Issue a pair with explicit validities in milliseconds.
    pub fn issue_with_validity(
        &self,
        username: &str,
        access_validity_ms: i64,
        refresh_validity_ms: i64,
    ) -> Result<TokenPair, TokenError> {
        self.issue_for(username, None, access_validity_ms, refresh_validity_ms)
    }

    /// Issue a pair that also carries an `authorities` claim.
    ///
    /// `authorities` is stored verbatim; an empty or blank string is omitted.
    pub fn issue_for(
        &self,
        username: &str,
        authorities: Option<&str>,
        access_validity_ms: i64,
        refresh_validity_ms: i64,
    ) -> Result<TokenPair, TokenError> {
        issue_with(
            &self.current.load(),
            username,
            authorities,
            access_validity_ms,
            refresh_validity_ms,
            Utc::now(),
        )
    }

    /// [`TokenManager::issue_for`] with an explicit clock reading.
    pub fn issue_at(
        &self,
        username: &str,
        authorities: Option<&str>,
        access_validity_ms: i64,
        refresh_validity_ms: i64,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        issue_with(
            &self.current.load(),
            username,
            authorities,
            access_validity_ms,
            refresh_validity_ms,
            now,
        )
    }

    pub fn inspect(&self, token: &str) -> TokenStatus {
        self.inspect_at(token, Utc::now())
    }

    /// Classify `token` as valid, expired or malformed as of `now`.
    pub fn inspect_at(&self, token: &str, now: DateTime<Utc>) -> TokenStatus {
        match self.parse(token) {
            Ok(claims) if claims.is_live_at(now) => TokenStatus::Valid(claims),
            Ok(claims) => TokenStatus::Expired(claims),
            Err(e) => TokenStatus::Malformed(e),
        }
    }

    /// True iff the signature verifies and the token has not expired.
    pub fn validate(&self, token: &str) -> bool {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        self.inspect_at(token, now).is_valid()
    }

    /// Verify the signature and return the claims. Expiry is not checked.
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        codec::decode(token, &self.current.load().keys)
    }

    /// Parse `token` and project a value out of its claims.
    pub fn extract_claim<T, F>(&self, token: &str, selector: F) -> Result<T, TokenError>
    where
        F: FnOnce(&Claims) -> T,
    {
        self.parse(token).map(|claims| selector(&claims))
    }

    pub fn username(&self, token: &str) -> Result<String, TokenError> {
        self.extract_claim(token, |claims| claims.sub.clone())
    }

    /// Expiration instant of `token` in the local offset.
    pub fn expiration(&self, token: &str) -> Result<DateTime<FixedOffset>, TokenError> {
        self.extract_claim(token, Claims::expires_at)?
            .map(to_local)
            .ok_or_else(|| TokenError::Malformed("exp is out of range".to_string()))
    }

    /// Replace keys and settings from `config`.
    ///
    /// The new key pair is loaded before anything is swapped; on error the
    /// current state is kept.
    pub fn reload(&self, config: &JwtConfig) -> Result<(), KeyMaterialError> {
        let keys = KeyPair::load(&config.private_key, &config.public_key)?;
        self.current.store(Arc::new(Snapshot {
            keys,
            settings: Settings::from(config),
        }));
        tracing::info!(issuer = %config.issuer, "Reloaded token keys and settings");
        Ok(())
    }

    /// Replace only the key pair, keeping the current settings.
    pub fn reload_keys(&self, keys: KeyPair) {
        self.current.rcu(|current| Snapshot {
            keys: keys.clone(),
            settings: current.settings.clone(),
        });
        tracing::info!("Reloaded token keys");
    }

    pub fn issuer(&self) -> String {
        self.current.load().settings.issuer.clone()
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.current.load();
        f.debug_struct("TokenManager")
            .field("issuer", &snapshot.settings.issuer)
            .field("access_ms", &snapshot.settings.access_token_validity_ms)
            .field("refresh_ms", &snapshot.settings.refresh_token_validity_ms)
            .finish_non_exhaustive()
    }
}

fn issue_with(
    snapshot: &Snapshot,
    username: &str,
    authorities: Option<&str>,
    access_validity_ms: i64,
    refresh_validity_ms: i64,
    now: DateTime<Utc>,
) -> Result<TokenPair, TokenError> {
    let issued_at = DateTime::from_timestamp(now.timestamp(), 0)
        .ok_or_else(|| TokenError::Signing("clock is out of range".to_string()))?;
    let access_expires_at = expiry(issued_at, access_validity_ms)?;
    let refresh_expires_at = expiry(issued_at, refresh_validity_ms)?;

    let base = Claims {
        sub: username.to_string(),
        iss: snapshot.settings.issuer.clone(),
        iat: issued_at.timestamp(),
        exp: 0,
        authorities: authorities
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string),
    };

    let access_token = codec::encode(
        &Claims {
            exp: numeric_date_ceil(access_expires_at),
            ..base.clone()
        },
        &snapshot.keys,
    )?;
    let refresh_token = codec::encode(
        &Claims {
            exp: numeric_date_ceil(refresh_expires_at),
            ..base
        },
        &snapshot.keys,
    )?;

    tracing::debug!(
        sub = %username,
        access_expires_at = %access_expires_at,
        refresh_expires_at = %refresh_expires_at,
        "Issued token pair"
    );

    Ok(TokenPair {
        access_token,
        issued_at: to_local(issued_at),
        access_token_expires_at: to_local(access_expires_at),
        refresh_token,
        refresh_token_expires_at: to_local(refresh_expires_at),
    })
}

fn expiry(issued_at: DateTime<Utc>, validity_ms: i64) -> Result<DateTime<Utc>, TokenError> {
    if validity_ms <= 0 {
        return Err(TokenError::InvalidValidity(validity_ms));
    }
    Duration::try_milliseconds(validity_ms)
        .and_then(|validity| issued_at.checked_add_signed(validity))
        .ok_or(TokenError::InvalidValidity(validity_ms))
}

fn numeric_date_ceil(instant: DateTime<Utc>) -> i64 {
    let seconds = instant.timestamp();
    if instant.timestamp_subsec_nanos() > 0 {
        seconds + 1
    } else {
        seconds
    }
}

fn to_local(instant: DateTime<Utc>) -> DateTime<FixedOffset> {
    instant.with_timezone(&Local).fixed_offset()
}
