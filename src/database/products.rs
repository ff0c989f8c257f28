// ABOUTME: Database operations for catalog products
// ABOUTME: Products carry the file sets that requests can inherit by value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

use crate::errors::{AppError, AppResult};
use crate::models::{CompanyId, FileAttachment, Product};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Product database operations
pub struct ProductManager {
    pool: SqlitePool,
}

impl ProductManager {
    /// Create a new product manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a product with its attached files
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(
        &self,
        company: &CompanyId,
        name: &str,
        description: Option<&str>,
        files: &[FileAttachment],
    ) -> AppResult<Product> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO products (id, company_id, name, description, files, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&id)
        .bind(company.as_str())
        .bind(name)
        .bind(description)
        .bind(encode_files(files)?)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create product: {e}")))?;

        Ok(Product {
            id,
            company_id: company.clone(),
            name: name.to_owned(),
            description: description.map(ToOwned::to_owned),
            files: files.to_vec(),
            created_at: now,
        })
    }

    /// Get a product by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, product_id: &str) -> AppResult<Option<Product>> {
        let row = sqlx::query(
            r"
            SELECT id, company_id, name, description, files, created_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get product: {e}")))?;

        row.map(row_to_product).transpose()
    }

    /// List a company's products, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_for_company(&self, company: &CompanyId) -> AppResult<Vec<Product>> {
        let rows = sqlx::query(
            r"
            SELECT id, company_id, name, description, files, created_at
            FROM products
            WHERE company_id = $1
            ORDER BY created_at DESC, rowid DESC
            ",
        )
        .bind(company.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list products: {e}")))?;

        rows.into_iter().map(row_to_product).collect()
    }
}

fn encode_files(files: &[FileAttachment]) -> AppResult<String> {
    serde_json::to_string(files)
        .map_err(|e| AppError::database(format!("Failed to encode file list: {e}")))
}

fn row_to_product(r: sqlx::sqlite::SqliteRow) -> AppResult<Product> {
    let files: Vec<FileAttachment> = serde_json::from_str(&r.get::<String, _>("files"))
        .map_err(|e| AppError::database(format!("Corrupt file list in storage: {e}")))?;

    Ok(Product {
        id: r.get("id"),
        company_id: CompanyId::new(r.get::<String, _>("company_id")),
        name: r.get("name"),
        description: r.get("description"),
        files,
        created_at: r.get("created_at"),
    })
}
