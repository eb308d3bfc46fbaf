// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Granted authorities.

use serde::{Deserialize, Serialize};

/// Prefix that turns a role name into an authority, `ADMIN` → `ROLE_ADMIN`.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Role required by administrative routes.
pub const ADMIN_ROLE: &str = "ADMIN";

/// A single granted authority such as `ROLE_ADMIN`.
///
/// Authorities are opaque strings. Roles are authorities carrying the
/// [`ROLE_PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    pub fn new(value: impl Into<String>) -> Self {
        Authority(value.into())
    }

    /// Build the authority for a role name, adding the prefix if missing.
    pub fn role(name: &str) -> Self {
        if name.starts_with(ROLE_PREFIX) {
            Authority(name.to_string())
        } else {
            Authority(format!("{ROLE_PREFIX}{name}"))
        }
    }

    /// Parse a comma-separated list. Entries are trimmed; empty ones dropped.
    pub fn parse_list(value: &str) -> Vec<Authority> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Authority::new)
            .collect()
    }

    /// Join authorities into the comma-separated claim form.
    pub fn join(authorities: &[Authority]) -> String {
        authorities
            .iter()
            .map(Authority::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this authority grants `role` (with or without prefix).
    pub fn is_role(&self, role: &str) -> bool {
        match role.strip_prefix(ROLE_PREFIX) {
            Some(_) => self.0 == role,
            None => self
                .0
                .strip_prefix(ROLE_PREFIX)
                .is_some_and(|name| name == role),
        }
    }
}

impl std::fmt::Display for Authority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Authority {
    fn from(value: &str) -> Self {
        Authority::new(value)
    }
}
