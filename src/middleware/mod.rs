// ABOUTME: HTTP middleware components for the REST boundary
// ABOUTME: Authentication runs before any handler logic touches core state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! Request middleware

/// Bearer-credential authentication
pub mod auth;

/// Cross-origin resource sharing configuration
pub mod cors;

pub use auth::AuthMiddleware;
pub use cors::setup_cors;
