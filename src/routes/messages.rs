// ABOUTME: Company-to-company messaging route handlers
// ABOUTME: Thread summaries, thread history with read-marking, and posting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! Messaging routes
//!
//! Threads are two-party conversations keyed by `thread-<idA>-<idB>`.
//! Listing a thread's messages marks the caller's unread messages read as a
//! best-effort side effect. All handlers require JWT authentication.

use crate::errors::AppError;
use crate::models::{CompanyId, Message, ThreadSummary};
use crate::server::ServerResources;
use crate::threads::ThreadKey;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to post a message into a thread
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    /// Message body
    pub text: String,
    /// Optional explicit sender; defaults to the caller's company
    #[serde(default, alias = "senderCompanyId")]
    pub sender_company_id: Option<CompanyId>,
}

/// Response for the thread listing
#[derive(Debug, Serialize, Deserialize)]
pub struct ThreadListResponse {
    /// One summary per thread, most recent first
    pub threads: Vec<ThreadSummary>,
    /// Total count
    pub total: usize,
}

/// Response for a thread's message history
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageListResponse {
    /// Messages in ascending timestamp order
    pub messages: Vec<Message>,
}

// ============================================================================
// Message Routes
// ============================================================================

/// Messaging routes handler
pub struct MessageRoutes;

impl MessageRoutes {
    /// Create all messaging routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/messages/threads", get(Self::list_threads))
            .route("/api/messages/:thread_id", get(Self::list_messages))
            .route("/api/messages/:thread_id", post(Self::post_message))
            .with_state(resources)
    }

    /// List the caller's threads with their latest message
    async fn list_threads(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers)?;

        let threads = resources
            .message_manager()
            .list_threads(&auth.company_id)
            .await?;

        let total = threads.len();
        let response = ThreadListResponse { threads, total };

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// List a thread's messages, marking the caller's unread ones read
    async fn list_messages(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(thread_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers)?;
        let thread_key = ThreadKey::parse(&thread_id)?;

        let messages = resources
            .message_manager()
            .list_messages(&thread_key, &auth.company_id)
            .await?;

        Ok((StatusCode::OK, Json(MessageListResponse { messages })).into_response())
    }

    /// Post a message into a thread
    async fn post_message(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(thread_id): Path<String>,
        Json(request): Json<PostMessageRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers)?;
        let thread_key = ThreadKey::parse(&thread_id)?;

        // Legacy clients send the sender explicitly; the caller's company is
        // the default
        let sender = request.sender_company_id.unwrap_or(auth.company_id);

        let message = resources
            .message_manager()
            .post_message(&thread_key, &sender, &request.text)
            .await?;

        Ok((StatusCode::CREATED, Json(message)).into_response())
    }
}
