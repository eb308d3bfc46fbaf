// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! RS256 bearer-token issuance and request authentication.
//!
//! ## Auth Flow
//!
//! 1. A client obtains a token pair from the public issuance endpoint
//! 2. The client sends `Authorization: Bearer <access token>`
//! 3. The server:
//!    - Verifies the RS256 signature with the configured public key
//!    - Checks `exp` against the current time
//!    - Extracts:
//!      - `sub` → principal username
//!      - `authorities` → granted roles (comma-separated, optional)
//! 4. Handlers declare their access rule through an extractor
//!    (`Auth`, `AdminOnly`, `OptionalAuth`)
//!
//! ## Security
//!
//! - A bad or expired token never fails the request by itself; it leaves the
//!   request anonymous and the route's extractor decides (401/403)
//! - Keys are loaded once at startup and swapped atomically on reload
//! - Only RS256 is accepted

pub mod authority;
pub mod claims;
pub mod codec;
pub mod error;
pub mod extractor;
pub mod keys;
pub mod manager;
pub mod middleware;
pub mod resolver;

pub use authority::Authority;
pub use claims::{Claims, Principal};
pub use error::{AuthError, TokenError};
pub use extractor::{AdminOnly, Auth, OptionalAuth};
pub use keys::{KeyMaterialError, KeyPair};
pub use manager::{TokenManager, TokenPair, TokenStatus};
pub use resolver::{AuthenticationOutcome, RejectReason};
