// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::keys::KeyMaterialError;
use crate::auth::TokenManager;
use crate::config::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub token_manager: Arc<TokenManager>,
}

impl AppState {
    pub fn new(token_manager: TokenManager) -> Self {
        Self {
            token_manager: Arc::new(token_manager),
        }
    }

    /// Load keys from `config` and build the state.
    pub fn from_config(config: &JwtConfig) -> Result<Self, KeyMaterialError> {
        Ok(Self::new(TokenManager::new(config)?))
    }
}
