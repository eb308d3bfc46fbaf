// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_ISSUER` | `iss` claim of issued tokens | Required |
//! | `JWT_PRIVATE_KEY` | PKCS#8 private key, file path or inline PEM | Required |
//! | `JWT_PUBLIC_KEY` | X.509 public key, file path or inline PEM | Required |
//! | `JWT_ACCESS_TOKEN_VALIDITY_MS` | Access token lifetime (ms) | `3600000` |
//! | `JWT_REFRESH_TOKEN_VALIDITY_MS` | Refresh token lifetime (ms) | `1209600000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::net::SocketAddr;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_ISSUER_ENV: &str = "JWT_ISSUER";
pub const JWT_PRIVATE_KEY_ENV: &str = "JWT_PRIVATE_KEY";
pub const JWT_PUBLIC_KEY_ENV: &str = "JWT_PUBLIC_KEY";
pub const JWT_ACCESS_TOKEN_VALIDITY_ENV: &str = "JWT_ACCESS_TOKEN_VALIDITY_MS";
pub const JWT_REFRESH_TOKEN_VALIDITY_ENV: &str = "JWT_REFRESH_TOKEN_VALIDITY_MS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// One hour.
pub const DEFAULT_ACCESS_TOKEN_VALIDITY_MS: i64 = 60 * 60 * 1000;

/// Fourteen days.
pub const DEFAULT_REFRESH_TOKEN_VALIDITY_MS: i64 = 14 * 24 * 60 * 60 * 1000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Token issuance and verification settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtConfig {
    pub issuer: String,
    /// File path or inline PEM (PKCS#8)
    pub private_key: String,
    /// File path or inline PEM (X.509 SPKI)
    pub public_key: String,
    pub access_token_validity_ms: i64,
    pub refresh_token_validity_ms: i64,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            issuer: required(JWT_ISSUER_ENV)?,
            private_key: required(JWT_PRIVATE_KEY_ENV)?,
            public_key: required(JWT_PUBLIC_KEY_ENV)?,
            access_token_validity_ms: validity(
                JWT_ACCESS_TOKEN_VALIDITY_ENV,
                DEFAULT_ACCESS_TOKEN_VALIDITY_MS,
            )?,
            refresh_token_validity_ms: validity(
                JWT_REFRESH_TOKEN_VALIDITY_ENV,
                DEFAULT_REFRESH_TOKEN_VALIDITY_MS,
            )?,
        })
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var(HOST_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match env::var(PORT_ENV) {
            Ok(value) => value.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: PORT_ENV,
                value,
                reason: e.to_string(),
            })?,
            Err(_) => DEFAULT_PORT,
        };
        Ok(Self { host, port })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let value = format!("{}:{}", self.host, self.port);
        value.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            name: HOST_ENV,
            reason: e.to_string(),
            value,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn validity(name: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(name) {
        Ok(value) => parse_validity(name, &value),
        Err(_) => Ok(default),
    }
}

fn parse_validity(name: &'static str, value: &str) -> Result<i64, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason,
    };
    let ms: i64 = value.trim().parse().map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?;
    if ms <= 0 {
        return Err(invalid("must be a positive number of milliseconds".to_string()));
    }
    Ok(ms)
}
