// ABOUTME: Configuration module for environment-driven server settings
// ABOUTME: All runtime configuration comes from environment variables with sane defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! Configuration management
//!
//! Environment-only configuration: every knob is an environment variable with
//! a default suitable for local development.

/// Environment variable driven server configuration
pub mod environment;

pub use environment::ServerConfig;
