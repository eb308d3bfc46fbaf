// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tokengate - RS256 Bearer Token Service
//!
//! Issues signed access/refresh token pairs and authenticates requests that
//! carry `Authorization: Bearer <token>`. Failures are reported through one
//! uniform JSON error envelope.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Key loading, token codec, token manager, request authentication
//! - `error` - Error classification and the JSON error envelope
//! - `config` - Environment configuration
//! - `logging` - Tracing subscriber setup

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
