// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database, storage, and company/user creation helpers
#![allow(dead_code, missing_docs, clippy::unwrap_used, clippy::expect_used)]

//! Shared test utilities for `procura`
//!
//! Common setup to reduce duplication across integration tests: an
//! in-memory database, a disposable upload directory, and helpers that
//! register a company with one user and mint its bearer token.

use anyhow::Result;
use procura::{
    auth::AuthManager,
    config::environment::{
        AuthConfig, DatabaseConfig, SecurityConfig, ServerConfig, UploadConfig,
    },
    database::Database,
    models::{Company, User},
    server::ServerResources,
};
use std::sync::Arc;
use tempfile::TempDir;

/// Everything a routes test needs, with the upload dir kept alive
pub struct TestContext {
    pub resources: Arc<ServerResources>,
    pub upload_dir: TempDir,
}

impl TestContext {
    /// The router under test
    pub fn router(&self) -> axum::Router {
        procura::routes::api_router(self.resources.clone())
    }

    /// Files currently present in the request upload area
    pub fn request_area_files(&self) -> Vec<String> {
        list_files(&self.upload_dir.path().join("requests"))
    }

    /// Files currently present in the product upload area
    pub fn product_area_files(&self) -> Vec<String> {
        list_files(&self.upload_dir.path().join("products"))
    }
}

fn list_files(dir: &std::path::Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Standard test setup: in-memory database plus a temp upload dir
pub async fn create_test_context() -> Result<TestContext> {
    create_test_context_with_max_file_size(1024 * 1024).await
}

/// Test setup with a custom per-file upload bound
pub async fn create_test_context_with_max_file_size(max_bytes: u64) -> Result<TestContext> {
    let upload_dir = tempfile::tempdir()?;

    let config = ServerConfig {
        http_port: 0,
        log_level: "warn".into(),
        database: DatabaseConfig {
            url: "sqlite::memory:".into(),
            auto_migrate: true,
        },
        auth: AuthConfig {
            jwt_secret: "test-secret-for-integration-tests".into(),
            jwt_expiry_hours: 1,
        },
        uploads: UploadConfig {
            directory: upload_dir.path().to_path_buf(),
            max_file_size_bytes: max_bytes,
        },
        security: SecurityConfig {
            cors_origins: vec!["*".into()],
        },
    };

    let database = Database::new(&config.database.url).await?;
    let auth_manager = AuthManager::new(&config.auth.jwt_secret, config.auth.jwt_expiry_hours);

    let resources = Arc::new(ServerResources::new(
        database,
        auth_manager,
        Arc::new(config),
    ));
    resources.storage.init().await?;

    Ok(TestContext {
        resources,
        upload_dir,
    })
}

/// Register a company with one user and mint its bearer token.
///
/// Returns the company, the user, and a ready-to-send `Bearer ...` header
/// value.
pub async fn create_test_company(
    resources: &Arc<ServerResources>,
    company_name: &str,
    email: &str,
) -> Result<(Company, User, String)> {
    let users = resources.user_manager();

    let company = users.create_company(company_name).await?;
    // Minimum cost keeps test setup fast; production uses DEFAULT_COST
    let password_hash = bcrypt::hash("test-password", 4)?;
    let user = users
        .create_user(email, &password_hash, None, &company.id)
        .await?;

    let token = resources.auth_manager.generate_token(&user)?;

    Ok((company, user, format!("Bearer {token}")))
}
