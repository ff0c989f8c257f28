// ABOUTME: Centralized resource container and HTTP server entry point
// ABOUTME: Shares database, auth, and storage handles across all route handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! # Server Resources
//!
//! Centralized resource container for dependency injection. Expensive
//! shared objects (pool, auth manager, storage handle) are created once and
//! shared via `Arc` instead of being rebuilt per request.

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::{Database, MessageManager, ProductManager, RequestManager, UserManager};
use crate::errors::AppResult;
use crate::middleware::AuthMiddleware;
use crate::storage::FileStorage;
use std::sync::Arc;
use tracing::info;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Shared database handle
    pub database: Arc<Database>,
    /// JWT manager
    pub auth_manager: Arc<AuthManager>,
    /// Bearer-credential middleware
    pub auth_middleware: AuthMiddleware,
    /// Attachment storage collaborator
    pub storage: Arc<FileStorage>,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create new server resources with proper Arc sharing
    #[must_use]
    pub fn new(database: Database, auth_manager: AuthManager, config: Arc<ServerConfig>) -> Self {
        let auth_manager = Arc::new(auth_manager);
        let storage = Arc::new(FileStorage::new(
            config.uploads.directory.clone(),
            config.uploads.max_file_size_bytes,
        ));

        Self {
            database: Arc::new(database),
            auth_middleware: AuthMiddleware::new(auth_manager.clone()),
            auth_manager,
            storage,
            config,
        }
    }

    /// Message store over the shared pool
    #[must_use]
    pub fn message_manager(&self) -> MessageManager {
        MessageManager::new(self.database.pool().clone())
    }

    /// Request lifecycle store over the shared pool
    #[must_use]
    pub fn request_manager(&self) -> RequestManager {
        RequestManager::new(self.database.pool().clone())
    }

    /// Product store over the shared pool
    #[must_use]
    pub fn product_manager(&self) -> ProductManager {
        ProductManager::new(self.database.pool().clone())
    }

    /// Company and user store over the shared pool
    #[must_use]
    pub fn user_manager(&self) -> UserManager {
        UserManager::new(self.database.pool().clone())
    }
}

/// Bind the HTTP listener and serve until shutdown
///
/// # Errors
///
/// Returns an error if the upload areas cannot be created, the port cannot
/// be bound, or the server loop fails.
pub async fn run(resources: Arc<ServerResources>) -> AppResult<()> {
    resources.storage.init().await?;

    let port = resources.config.http_port;
    let router = crate::routes::api_router(resources);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| crate::errors::AppError::internal(format!("Failed to bind port {port}: {e}")))?;

    info!(port, "HTTP server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| crate::errors::AppError::internal(format!("Server error: {e}")))
}
