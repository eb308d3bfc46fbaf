// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    extract::{rejection::QueryRejection, ConnectInfo, Query, Request},
    Json,
};

use crate::error::ApiError;
use crate::models::{IndexQuery, IndexResponse, ResponseMeta};

pub const WELCOME_MESSAGE: &str = "Welcome to the tokengate API server :)";

/// Index and health check handler.
///
/// With `?show_headers=true` the response also echoes the request headers
/// (first value per name) and the peer address when it is known.
pub async fn index(
    query: Result<Query<IndexQuery>, QueryRejection>,
    request: Request,
) -> Result<Json<IndexResponse>, ApiError> {
    let Query(query) = query?;

    let mut response = IndexResponse {
        meta: ResponseMeta::with_message(WELCOME_MESSAGE),
        remote_addr: None,
        request_headers: None,
    };

    if query.show_headers {
        let mut headers = BTreeMap::new();
        for name in request.headers().keys() {
            if let Some(value) = request.headers().get(name).and_then(|v| v.to_str().ok()) {
                headers.insert(name.to_string(), value.to_string());
            }
        }
        response.request_headers = Some(headers);
        response.remote_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
    }

    Ok(Json(response))
}
