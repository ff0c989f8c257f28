// ABOUTME: Environment variable driven configuration with development defaults
// ABOUTME: One ServerConfig struct loaded once at startup and shared via Arc
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! Server configuration loaded from environment variables

use crate::constants::limits;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Attachment upload configuration
    pub uploads: UploadConfig,
    /// Security settings
    pub security: SecurityConfig,
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL (SQLite path)
    pub url: String,
    /// Run migrations on startup
    pub auto_migrate: bool,
}

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign and verify JWT bearer tokens
    pub jwt_secret: String,
    /// JWT expiry time in hours
    pub jwt_expiry_hours: i64,
}

/// Attachment upload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Root directory for stored attachments
    pub directory: PathBuf,
    /// Per-file size bound in bytes
    pub max_file_size_bytes: u64,
}

/// Security settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// CORS allowed origins ("*" for any)
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable fails to parse, or if
    /// `JWT_SECRET` is missing outside of development.
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            http_port: env_var_or("HTTP_PORT", &limits::DEFAULT_HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            log_level: env_var_or("RUST_LOG", "info"),

            database: DatabaseConfig {
                url: env_var_or("DATABASE_URL", "sqlite:./data/procura.db"),
                auto_migrate: env_var_or("AUTO_MIGRATE", "true")
                    .parse()
                    .context("Invalid AUTO_MIGRATE value")?,
            },

            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET")
                    .context("JWT_SECRET must be set (any long random string)")?,
                jwt_expiry_hours: env_var_or(
                    "JWT_EXPIRY_HOURS",
                    &limits::DEFAULT_JWT_EXPIRY_HOURS.to_string(),
                )
                .parse()
                .context("Invalid JWT_EXPIRY_HOURS value")?,
            },

            uploads: UploadConfig {
                directory: PathBuf::from(env_var_or("UPLOAD_DIR", "./data/uploads")),
                max_file_size_bytes: env_var_or(
                    "MAX_FILE_SIZE_BYTES",
                    &limits::DEFAULT_MAX_FILE_SIZE_BYTES.to_string(),
                )
                .parse()
                .context("Invalid MAX_FILE_SIZE_BYTES value")?,
            },

            security: SecurityConfig {
                cors_origins: parse_origins(&env_var_or("CORS_ORIGINS", "*")),
            },
        };

        Ok(config)
    }

    /// Whole-body limit for multipart endpoints: per-file bound plus slack
    #[must_use]
    pub const fn multipart_body_limit(&self) -> usize {
        (self.uploads.max_file_size_bytes + limits::UPLOAD_BODY_SLACK_BYTES) as usize
    }
}

fn env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_owned())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_splits_and_trims() {
        let origins = parse_origins("http://localhost:3000, https://app.example.com");
        assert_eq!(
            origins,
            vec!["http://localhost:3000", "https://app.example.com"]
        );
    }

    #[test]
    fn test_parse_origins_wildcard() {
        assert_eq!(parse_origins("*"), vec!["*"]);
    }
}
