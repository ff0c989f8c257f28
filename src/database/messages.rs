// ABOUTME: Database operations for two-party message threads
// ABOUTME: Append-only message log with per-recipient read state and thread summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

use crate::errors::{AppError, AppResult};
use crate::models::{CompanyId, Message, ThreadSummary};
use crate::threads::ThreadKey;
use sqlx::{Row, SqlitePool};
use tracing::warn;
use uuid::Uuid;

/// Message database operations
pub struct MessageManager {
    pool: SqlitePool,
}

impl MessageManager {
    /// Create a new message manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a message to a thread.
    ///
    /// The recipient is derived from the thread key and the sender; a key
    /// whose derivation fails leaves the recipient unset rather than
    /// blocking the post.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for empty text, otherwise `DatabaseError`.
    pub async fn post_message(
        &self,
        thread_key: &ThreadKey,
        sender: &CompanyId,
        text: &str,
    ) -> AppResult<Message> {
        if text.trim().is_empty() {
            return Err(AppError::invalid_input("Message text must not be empty"));
        }

        let recipient = thread_key.resolve_counterpart(sender).ok();
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO messages (id, thread_id, sender_company_id, recipient_company_id, text, read, created_at)
            VALUES ($1, $2, $3, $4, $5, 0, $6)
            ",
        )
        .bind(&id)
        .bind(thread_key.as_str())
        .bind(sender.as_str())
        .bind(recipient.as_ref().map(CompanyId::as_str))
        .bind(text)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to post message: {e}")))?;

        Ok(Message {
            id,
            thread_id: thread_key.as_str().to_owned(),
            sender_company_id: sender.clone(),
            recipient_company_id: recipient,
            text: text.to_owned(),
            read: false,
            created_at: now,
        })
    }

    /// List thread summaries for a company, most recent first.
    ///
    /// Each summary carries the latest message of its thread (ties broken by
    /// insertion order) plus the caller's unread count. An empty list is a
    /// valid result.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_threads(&self, company: &CompanyId) -> AppResult<Vec<ThreadSummary>> {
        let rows = sqlx::query(
            r"
            SELECT m.thread_id, m.sender_company_id, m.recipient_company_id, m.text, m.created_at,
                   (SELECT COUNT(*) FROM messages u
                    WHERE u.thread_id = m.thread_id
                      AND u.recipient_company_id = $1
                      AND u.read = 0) AS unread_count
            FROM messages m
            JOIN (
                SELECT thread_id, MAX(rowid) AS last_row
                FROM messages
                WHERE sender_company_id = $1 OR recipient_company_id = $1
                GROUP BY thread_id
            ) latest ON m.rowid = latest.last_row
            ORDER BY m.created_at DESC, m.rowid DESC
            ",
        )
        .bind(company.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list threads: {e}")))?;

        let summaries = rows
            .into_iter()
            .map(|r| ThreadSummary {
                thread_id: r.get("thread_id"),
                sender_company_id: CompanyId::new(r.get::<String, _>("sender_company_id")),
                recipient_company_id: r
                    .get::<Option<String>, _>("recipient_company_id")
                    .map(CompanyId::new),
                text: r.get("text"),
                last_message_at: r.get("created_at"),
                unread_count: r.get("unread_count"),
            })
            .collect();

        Ok(summaries)
    }

    /// List all messages of a thread in ascending timestamp order.
    ///
    /// Side effect: the caller's unread messages in this thread are marked
    /// read, best-effort. A failed update is logged and the list is still
    /// returned; read state catches up on a later call.
    ///
    /// # Errors
    ///
    /// Returns an error if the message fetch itself fails
    pub async fn list_messages(
        &self,
        thread_key: &ThreadKey,
        caller: &CompanyId,
    ) -> AppResult<Vec<Message>> {
        let rows = sqlx::query(
            r"
            SELECT id, thread_id, sender_company_id, recipient_company_id, text, read, created_at
            FROM messages
            WHERE thread_id = $1
            ORDER BY created_at ASC, rowid ASC
            ",
        )
        .bind(thread_key.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list messages: {e}")))?;

        let messages = rows
            .into_iter()
            .map(|r| Message {
                id: r.get("id"),
                thread_id: r.get("thread_id"),
                sender_company_id: CompanyId::new(r.get::<String, _>("sender_company_id")),
                recipient_company_id: r
                    .get::<Option<String>, _>("recipient_company_id")
                    .map(CompanyId::new),
                text: r.get("text"),
                read: r.get("read"),
                created_at: r.get("created_at"),
            })
            .collect();

        let marked = sqlx::query(
            r"
            UPDATE messages
            SET read = 1
            WHERE thread_id = $1 AND recipient_company_id = $2 AND read = 0
            ",
        )
        .bind(thread_key.as_str())
        .bind(caller.as_str())
        .execute(&self.pool)
        .await;

        if let Err(e) = marked {
            warn!(thread = %thread_key, error = %e, "Failed to mark messages read");
        }

        Ok(messages)
    }
}
