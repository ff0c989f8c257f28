// ABOUTME: Database management for companies, users, messages, requests, and products
// ABOUTME: Owns pool creation and inline schema migrations; managers own the queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! # Database Management
//!
//! SQLite-backed persistence. One [`Database`] owns the pool and the schema;
//! per-domain managers (`MessageManager`, `RequestManager`, ...) borrow the
//! pool and own their queries. Timestamps are stored as RFC 3339 text, file
//! lists as JSON arrays.

mod messages;
mod products;
mod requests;
mod users;

pub use messages::MessageManager;
pub use products::ProductManager;
pub use requests::{RecipientOutcome, RequestManager};
pub use users::UserManager;

use crate::errors::{AppError, AppResult};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite, SqlitePool};

/// Database manager owning the connection pool and schema
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection or a migration fails.
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") && !database_url.contains("::memory:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        // An in-memory database exists per connection; a single connection
        // keeps the schema visible to every query
        let pool = if connection_options.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect(&connection_options)
                .await
        } else {
            SqlitePool::connect(&connection_options).await
        }
        .map_err(|e| AppError::database(format!("Failed to connect: {e}")).with_source(e))?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a statement fails.
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS companies (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(migration_error)?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                display_name TEXT,
                company_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_active TEXT NOT NULL,
                FOREIGN KEY (company_id) REFERENCES companies (id)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(migration_error)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await
            .map_err(migration_error)?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                thread_id TEXT NOT NULL,
                sender_company_id TEXT NOT NULL,
                recipient_company_id TEXT,
                text TEXT NOT NULL,
                read INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(migration_error)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_thread ON messages(thread_id)")
            .execute(&self.pool)
            .await
            .map_err(migration_error)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_recipient ON messages(recipient_company_id, read)",
        )
        .execute(&self.pool)
        .await
        .map_err(migration_error)?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS requests (
                id TEXT PRIMARY KEY,
                sender_company_id TEXT NOT NULL,
                recipient_company_id TEXT NOT NULL,
                subject TEXT NOT NULL,
                text TEXT NOT NULL,
                files TEXT NOT NULL DEFAULT '[]', -- JSON array
                product_id TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                response TEXT,
                response_files TEXT NOT NULL DEFAULT '[]', -- JSON array
                responded_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(migration_error)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_requests_sender ON requests(sender_company_id)")
            .execute(&self.pool)
            .await
            .map_err(migration_error)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_requests_recipient ON requests(recipient_company_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(migration_error)?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS products (
                id TEXT PRIMARY KEY,
                company_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                files TEXT NOT NULL DEFAULT '[]', -- JSON array
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(migration_error)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_company ON products(company_id)")
            .execute(&self.pool)
            .await
            .map_err(migration_error)?;

        Ok(())
    }
}

fn migration_error(e: sqlx::Error) -> AppError {
    AppError::database(format!("Migration failed: {e}")).with_source(e)
}
