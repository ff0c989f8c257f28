// ABOUTME: CORS middleware configuration for HTTP API endpoints
// ABOUTME: Wildcard for development, explicit origin list for production
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

use crate::config::ServerConfig;
use http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Configure CORS for the API.
///
/// `CORS_ORIGINS="*"` (the default) allows any origin for development; a
/// comma-separated origin list restricts it for production.
#[must_use]
pub fn setup_cors(config: &ServerConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;

    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();

        if parsed.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(parsed)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
}
