// ABOUTME: Route module organization for the Procura HTTP API
// ABOUTME: Assembles per-domain routers and the shared middleware layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! Route modules organized by domain
//!
//! Each domain module contains route definitions and thin handlers that
//! delegate to the database managers and the storage collaborator.

/// Registration and login routes
pub mod auth;
/// Health check routes
pub mod health;
/// Company-to-company messaging routes
pub mod messages;
/// Product catalog routes
pub mod products;
/// Procurement request routes
pub mod requests;
/// Multipart upload collection shared by the file-carrying routes
mod uploads;

pub use auth::AuthRoutes;
pub use health::HealthRoutes;
pub use messages::MessageRoutes;
pub use products::ProductRoutes;
pub use requests::RequestRoutes;

use crate::middleware::setup_cors;
use crate::server::ServerResources;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Assemble the full API router with tracing, CORS, and body limits
#[must_use]
pub fn api_router(resources: Arc<ServerResources>) -> Router {
    let body_limit = resources.config.multipart_body_limit();
    let cors = setup_cors(&resources.config);

    Router::new()
        .merge(HealthRoutes::routes())
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(MessageRoutes::routes(resources.clone()))
        .merge(RequestRoutes::routes(resources.clone()))
        .merge(ProductRoutes::routes(resources))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
