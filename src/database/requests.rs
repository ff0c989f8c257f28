// ABOUTME: Database operations for procurement request records
// ABOUTME: Per-recipient fan-out creation, response updates, and deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

use crate::errors::{AppError, AppResult};
use crate::models::{CompanyId, FileAttachment, RequestRecord, RequestStatus};
use sqlx::{Row, SqlitePool};
use tracing::warn;
use uuid::Uuid;

/// Result of one recipient's slice of a fan-out creation.
///
/// Fan-out is explicitly best-effort: one recipient failing never rolls back
/// or blocks the others, so the caller gets one of these per recipient.
#[derive(Debug)]
pub enum RecipientOutcome {
    /// The record for this recipient was created
    Created(RequestRecord),
    /// This recipient's record could not be created
    Failed {
        /// The recipient whose record failed
        recipient: CompanyId,
        /// Why it failed
        error: AppError,
    },
}

/// Request database operations
pub struct RequestManager {
    pool: SqlitePool,
}

impl RequestManager {
    /// Create a new request manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fan a bulk submission out into one independent record per recipient.
    ///
    /// Each record gets its own copy of the attachment metadata (fresh file
    /// ids, shared storage pointers). A recipient that does not resolve to
    /// an existing company, or whose insert fails, yields a `Failed` entry
    /// while the remaining recipients proceed.
    ///
    /// # Errors
    ///
    /// This method itself only fails on catastrophic misuse; per-recipient
    /// failures are reported inside the returned outcome list.
    pub async fn create_fanout(
        &self,
        sender: &CompanyId,
        recipients: &[CompanyId],
        subject: &str,
        text: &str,
        files: &[FileAttachment],
        product_id: Option<&str>,
    ) -> AppResult<Vec<RecipientOutcome>> {
        let mut outcomes = Vec::with_capacity(recipients.len());

        for recipient in recipients {
            match self
                .create_single(sender, recipient, subject, text, files, product_id)
                .await
            {
                Ok(record) => outcomes.push(RecipientOutcome::Created(record)),
                Err(error) => {
                    warn!(recipient = %recipient, error = %error, "Fan-out slice failed");
                    outcomes.push(RecipientOutcome::Failed {
                        recipient: recipient.clone(),
                        error,
                    });
                }
            }
        }

        Ok(outcomes)
    }

    async fn create_single(
        &self,
        sender: &CompanyId,
        recipient: &CompanyId,
        subject: &str,
        text: &str,
        files: &[FileAttachment],
        product_id: Option<&str>,
    ) -> AppResult<RequestRecord> {
        let exists = sqlx::query("SELECT 1 AS present FROM companies WHERE id = $1")
            .bind(recipient.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check recipient: {e}")))?;
        if exists.is_none() {
            return Err(AppError::not_found("Recipient company"));
        }

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        // Fresh attachment ids per record; storage paths stay shared pointers
        let record_files: Vec<FileAttachment> = files.iter().map(FileAttachment::copied).collect();

        sqlx::query(
            r"
            INSERT INTO requests
                (id, sender_company_id, recipient_company_id, subject, text, files,
                 product_id, status, response, response_files, responded_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', NULL, '[]', NULL, $8, $8)
            ",
        )
        .bind(&id)
        .bind(sender.as_str())
        .bind(recipient.as_str())
        .bind(subject)
        .bind(text)
        .bind(encode_files(&record_files)?)
        .bind(product_id)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create request: {e}")))?;

        Ok(RequestRecord {
            id,
            sender_company_id: sender.clone(),
            recipient_company_id: recipient.clone(),
            subject: subject.to_owned(),
            text: text.to_owned(),
            files: record_files,
            product_id: product_id.map(ToOwned::to_owned),
            status: RequestStatus::Pending,
            response: None,
            response_files: Vec::new(),
            responded_at: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get a request by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, request_id: &str) -> AppResult<Option<RequestRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, sender_company_id, recipient_company_id, subject, text, files,
                   product_id, status, response, response_files, responded_at, created_at, updated_at
            FROM requests
            WHERE id = $1
            ",
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get request: {e}")))?;

        row.map(row_to_request).transpose()
    }

    /// List requests a company has sent, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_sent(&self, company: &CompanyId) -> AppResult<Vec<RequestRecord>> {
        self.list_by_column("sender_company_id", company).await
    }

    /// List requests a company has received, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_received(&self, company: &CompanyId) -> AppResult<Vec<RequestRecord>> {
        self.list_by_column("recipient_company_id", company).await
    }

    async fn list_by_column(
        &self,
        column: &str,
        company: &CompanyId,
    ) -> AppResult<Vec<RequestRecord>> {
        // column is one of two fixed identifiers, never user input
        let sql = format!(
            r"
            SELECT id, sender_company_id, recipient_company_id, subject, text, files,
                   product_id, status, response, response_files, responded_at, created_at, updated_at
            FROM requests
            WHERE {column} = $1
            ORDER BY created_at DESC, rowid DESC
            "
        );

        let rows = sqlx::query(&sql)
            .bind(company.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list requests: {e}")))?;

        rows.into_iter().map(row_to_request).collect()
    }

    /// Record the recipient's response.
    ///
    /// Overwrites any earlier response: the contract is idempotent
    /// overwrite, not "already responded" rejection.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the record vanished, otherwise `DatabaseError`.
    pub async fn respond(
        &self,
        request_id: &str,
        status: RequestStatus,
        response_text: &str,
        response_files: &[FileAttachment],
    ) -> AppResult<RequestRecord> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            r"
            UPDATE requests
            SET status = $1, response = $2, response_files = $3, responded_at = $4, updated_at = $4
            WHERE id = $5
            ",
        )
        .bind(status.as_str())
        .bind(response_text)
        .bind(encode_files(response_files)?)
        .bind(&now)
        .bind(request_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to respond to request: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Request"));
        }

        self.get(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request"))
    }

    /// Delete a request record
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, request_id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(request_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete request: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

fn encode_files(files: &[FileAttachment]) -> AppResult<String> {
    serde_json::to_string(files)
        .map_err(|e| AppError::database(format!("Failed to encode file list: {e}")))
}

fn decode_files(raw: &str) -> AppResult<Vec<FileAttachment>> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::database(format!("Corrupt file list in storage: {e}")))
}

fn row_to_request(r: sqlx::sqlite::SqliteRow) -> AppResult<RequestRecord> {
    let status_raw: String = r.get("status");
    let status = RequestStatus::parse(&status_raw)
        .ok_or_else(|| AppError::database(format!("Corrupt request status '{status_raw}'")))?;

    Ok(RequestRecord {
        id: r.get("id"),
        sender_company_id: CompanyId::new(r.get::<String, _>("sender_company_id")),
        recipient_company_id: CompanyId::new(r.get::<String, _>("recipient_company_id")),
        subject: r.get("subject"),
        text: r.get("text"),
        files: decode_files(&r.get::<String, _>("files"))?,
        product_id: r.get("product_id"),
        status,
        response: r.get("response"),
        response_files: decode_files(&r.get::<String, _>("response_files"))?,
        responded_at: r.get("responded_at"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}
