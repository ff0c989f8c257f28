// ABOUTME: Main library entry point for the Procura procurement platform backend
// ABOUTME: REST API with company messaging, request fan-out, and file attachments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

#![deny(unsafe_code)]

//! # Procura Server
//!
//! Backend for a B2B procurement platform. Companies exchange two-party
//! message threads and one-to-many procurement requests with file
//! attachments behind a JWT bearer-credential boundary.
//!
//! ## Architecture
//!
//! - **Thread identity**: pure derivation of `thread-<idA>-<idB>` keys and
//!   counterpart resolution
//! - **Message store**: append-only per-thread log with per-recipient read
//!   state
//! - **Request lifecycle**: best-effort fan-out creation, single response
//!   with replaceable attachments, deletion with best-effort cleanup
//! - **Collaborators**: JWT auth boundary, local file storage with request
//!   and product upload areas
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use procura::config::ServerConfig;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ServerConfig::from_env()?;
//! println!("Procura server configured on port {}", config.http_port);
//! # Ok(())
//! # }
//! ```

/// Authentication and JWT token management
pub mod auth;

/// Configuration management
pub mod config;

/// Application constants
pub mod constants;

/// Database management and per-domain stores
pub mod database;

/// Unified error handling with standard error codes and HTTP responses
pub mod errors;

/// Logging configuration
pub mod logging;

/// Request middleware (authentication, CORS)
pub mod middleware;

/// Core data models
pub mod models;

/// HTTP route handlers organized by domain
pub mod routes;

/// Shared server resources and the serve loop
pub mod server;

/// Attachment storage collaborator
pub mod storage;

/// Thread identity derivation for two-party conversations
pub mod threads;
