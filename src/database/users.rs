// ABOUTME: Database operations for companies and their users
// ABOUTME: Registration, login lookups, and last-active bookkeeping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{Company, CompanyId, User};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Company and user database operations
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a company
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_company(&self, name: &str) -> AppResult<Company> {
        let id = CompanyId::generate();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO companies (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(id.as_str())
            .bind(name)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create company: {e}")))?;

        Ok(Company {
            id,
            name: name.to_owned(),
            created_at: now,
        })
    }

    /// Get a company by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_company(&self, id: &CompanyId) -> AppResult<Option<Company>> {
        let row = sqlx::query("SELECT id, name, created_at FROM companies WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get company: {e}")))?;

        Ok(row.map(|r| Company {
            id: CompanyId::new(r.get::<String, _>("id")),
            name: r.get("name"),
            created_at: r.get("created_at"),
        }))
    }

    /// Check whether a company exists
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn company_exists(&self, id: &CompanyId) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 AS present FROM companies WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check company: {e}")))?;

        Ok(row.is_some())
    }

    /// Create a user belonging to a company
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` for a duplicate email, otherwise
    /// `DatabaseError`.
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        display_name: Option<&str>,
        company_id: &CompanyId,
    ) -> AppResult<User> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO users (id, email, password_hash, display_name, company_id, created_at, last_active)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ",
        )
        .bind(id.to_string())
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .bind(company_id.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::new(
                    ErrorCode::ResourceAlreadyExists,
                    "A user with this email already exists",
                )
            } else {
                AppError::database(format!("Failed to create user: {e}"))
            }
        })?;

        Ok(User {
            id,
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
            display_name: display_name.map(ToOwned::to_owned),
            company_id: company_id.clone(),
            created_at: now.clone(),
            last_active: now,
        })
    }

    /// Get a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, email, password_hash, display_name, company_id, created_at, last_active
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(row_to_user).transpose()
    }

    /// Update a user's last-active timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update_last_active(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_active = $1 WHERE id = $2")
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update last_active: {e}")))?;

        Ok(())
    }
}

fn row_to_user(r: sqlx::sqlite::SqliteRow) -> AppResult<User> {
    let id: String = r.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| AppError::database(format!("Corrupt user id in storage: {e}")))?;

    Ok(User {
        id,
        email: r.get("email"),
        password_hash: r.get("password_hash"),
        display_name: r.get("display_name"),
        company_id: CompanyId::new(r.get::<String, _>("company_id")),
        created_at: r.get("created_at"),
        last_active: r.get("last_active"),
    })
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.message().contains("UNIQUE constraint failed"))
}
