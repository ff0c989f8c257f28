// ABOUTME: Integration tests for the messaging route handlers
// ABOUTME: Thread summaries, read-marking side effects, and validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{create_test_company, create_test_context};
use helpers::axum_test::AxumTestRequest;
use procura::routes::messages::{MessageListResponse, ThreadListResponse};

use axum::http::StatusCode;
use serde_json::json;

fn thread_id(a: &str, b: &str) -> String {
    format!("thread-{a}-{b}")
}

// ============================================================================
// Posting
// ============================================================================

#[tokio::test]
async fn test_post_message_creates_record_with_derived_recipient() {
    let ctx = create_test_context().await.unwrap();
    let (alpha, _, alpha_auth) = create_test_company(&ctx.resources, "Alpha", "a@alpha.test")
        .await
        .unwrap();
    let (beta, _, _) = create_test_company(&ctx.resources, "Beta", "b@beta.test")
        .await
        .unwrap();

    let thread = thread_id(alpha.id.as_str(), beta.id.as_str());
    let response = AxumTestRequest::post(&format!("/api/messages/{thread}"))
        .header("authorization", &alpha_auth)
        .json(&json!({"text": "Need 100 units"}))
        .send(ctx.router())
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);

    let message: serde_json::Value = response.json();
    assert_eq!(message["thread_id"], thread);
    assert_eq!(message["sender_company_id"], alpha.id.as_str());
    assert_eq!(message["recipient_company_id"], beta.id.as_str());
    assert_eq!(message["read"], false);
}

#[tokio::test]
async fn test_post_message_rejects_empty_text() {
    let ctx = create_test_context().await.unwrap();
    let (alpha, _, alpha_auth) = create_test_company(&ctx.resources, "Alpha", "a@alpha.test")
        .await
        .unwrap();
    let (beta, _, _) = create_test_company(&ctx.resources, "Beta", "b@beta.test")
        .await
        .unwrap();

    let thread = thread_id(alpha.id.as_str(), beta.id.as_str());
    let response = AxumTestRequest::post(&format!("/api/messages/{thread}"))
        .header("authorization", &alpha_auth)
        .json(&json!({"text": "   "}))
        .send(ctx.router())
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_post_message_rejects_malformed_thread_key() {
    let ctx = create_test_context().await.unwrap();
    let (_, _, auth) = create_test_company(&ctx.resources, "Alpha", "a@alpha.test")
        .await
        .unwrap();

    let response = AxumTestRequest::post("/api/messages/thread-onlyonepart")
        .header("authorization", &auth)
        .json(&json!({"text": "hello"}))
        .send(ctx.router())
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "MALFORMED_THREAD_KEY");
}

#[tokio::test]
async fn test_post_message_accepts_structured_sender_reference() {
    let ctx = create_test_context().await.unwrap();
    let (alpha, _, alpha_auth) = create_test_company(&ctx.resources, "Alpha", "a@alpha.test")
        .await
        .unwrap();
    let (beta, _, _) = create_test_company(&ctx.resources, "Beta", "b@beta.test")
        .await
        .unwrap();

    // Legacy clients send the sender as a structured reference
    let thread = thread_id(alpha.id.as_str(), beta.id.as_str());
    let response = AxumTestRequest::post(&format!("/api/messages/{thread}"))
        .header("authorization", &alpha_auth)
        .json(&json!({
            "text": "hello",
            "senderCompanyId": {"_id": alpha.id.as_str()}
        }))
        .send(ctx.router())
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let message: serde_json::Value = response.json();
    assert_eq!(message["sender_company_id"], alpha.id.as_str());
    assert_eq!(message["recipient_company_id"], beta.id.as_str());
}

// ============================================================================
// Thread summaries
// ============================================================================

#[tokio::test]
async fn test_list_threads_empty_is_ok() {
    let ctx = create_test_context().await.unwrap();
    let (_, _, auth) = create_test_company(&ctx.resources, "Alpha", "a@alpha.test")
        .await
        .unwrap();

    let response = AxumTestRequest::get("/api/messages/threads")
        .header("authorization", &auth)
        .send(ctx.router())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let list: ThreadListResponse = response.json();
    assert_eq!(list.total, 0);
    assert!(list.threads.is_empty());
}

#[tokio::test]
async fn test_list_threads_keeps_latest_message_per_thread() {
    let ctx = create_test_context().await.unwrap();
    let (alpha, _, alpha_auth) = create_test_company(&ctx.resources, "Alpha", "a@alpha.test")
        .await
        .unwrap();
    let (beta, _, beta_auth) = create_test_company(&ctx.resources, "Beta", "b@beta.test")
        .await
        .unwrap();
    let (gamma, _, gamma_auth) = create_test_company(&ctx.resources, "Gamma", "g@gamma.test")
        .await
        .unwrap();

    let ab = thread_id(alpha.id.as_str(), beta.id.as_str());
    let ag = thread_id(alpha.id.as_str(), gamma.id.as_str());

    for (thread, auth, text) in [
        (&ab, &alpha_auth, "first to beta"),
        (&ab, &beta_auth, "beta answers"),
        (&ag, &alpha_auth, "first to gamma"),
        (&ag, &gamma_auth, "gamma answers"),
        (&ab, &alpha_auth, "latest overall"),
    ] {
        let response = AxumTestRequest::post(&format!("/api/messages/{thread}"))
            .header("authorization", auth)
            .json(&json!({"text": text}))
            .send(ctx.router())
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let response = AxumTestRequest::get("/api/messages/threads")
        .header("authorization", &alpha_auth)
        .send(ctx.router())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let list: ThreadListResponse = response.json();

    // One summary per thread, most recently active thread first
    assert_eq!(list.total, 2);
    assert_eq!(list.threads[0].thread_id, ab);
    assert_eq!(list.threads[0].text, "latest overall");
    assert_eq!(list.threads[1].thread_id, ag);
    assert_eq!(list.threads[1].text, "gamma answers");
}

#[tokio::test]
async fn test_list_threads_counts_unread_for_caller() {
    let ctx = create_test_context().await.unwrap();
    let (alpha, _, alpha_auth) = create_test_company(&ctx.resources, "Alpha", "a@alpha.test")
        .await
        .unwrap();
    let (beta, _, beta_auth) = create_test_company(&ctx.resources, "Beta", "b@beta.test")
        .await
        .unwrap();

    let thread = thread_id(alpha.id.as_str(), beta.id.as_str());
    for text in ["one", "two"] {
        AxumTestRequest::post(&format!("/api/messages/{thread}"))
            .header("authorization", &alpha_auth)
            .json(&json!({"text": text}))
            .send(ctx.router())
            .await;
    }

    let response = AxumTestRequest::get("/api/messages/threads")
        .header("authorization", &beta_auth)
        .send(ctx.router())
        .await;
    let list: ThreadListResponse = response.json();
    assert_eq!(list.threads[0].unread_count, 2);

    // Reading the thread drains the unread count
    AxumTestRequest::get(&format!("/api/messages/{thread}"))
        .header("authorization", &beta_auth)
        .send(ctx.router())
        .await;

    let response = AxumTestRequest::get("/api/messages/threads")
        .header("authorization", &beta_auth)
        .send(ctx.router())
        .await;
    let list: ThreadListResponse = response.json();
    assert_eq!(list.threads[0].unread_count, 0);
}

// ============================================================================
// Read marking
// ============================================================================

#[tokio::test]
async fn test_list_messages_marks_only_callers_unread_messages() {
    let ctx = create_test_context().await.unwrap();
    let (alpha, _, alpha_auth) = create_test_company(&ctx.resources, "Alpha", "a@alpha.test")
        .await
        .unwrap();
    let (beta, _, beta_auth) = create_test_company(&ctx.resources, "Beta", "b@beta.test")
        .await
        .unwrap();

    let thread = thread_id(alpha.id.as_str(), beta.id.as_str());
    AxumTestRequest::post(&format!("/api/messages/{thread}"))
        .header("authorization", &alpha_auth)
        .json(&json!({"text": "to beta"}))
        .send(ctx.router())
        .await;
    AxumTestRequest::post(&format!("/api/messages/{thread}"))
        .header("authorization", &beta_auth)
        .json(&json!({"text": "to alpha"}))
        .send(ctx.router())
        .await;

    // First listing by beta returns the pre-update read state
    let response = AxumTestRequest::get(&format!("/api/messages/{thread}"))
        .header("authorization", &beta_auth)
        .send(ctx.router())
        .await;
    let first: MessageListResponse = response.json();
    assert_eq!(first.messages.len(), 2);
    assert!(first.messages.iter().all(|m| !m.read));

    // Second listing shows beta's incoming message read; beta's own
    // outgoing message (addressed to alpha) is untouched
    let response = AxumTestRequest::get(&format!("/api/messages/{thread}"))
        .header("authorization", &beta_auth)
        .send(ctx.router())
        .await;
    let second: MessageListResponse = response.json();
    assert!(second.messages[0].read, "incoming message should be read");
    assert!(!second.messages[1].read, "outgoing message should be untouched");
}

#[tokio::test]
async fn test_list_messages_is_idempotent_on_content() {
    let ctx = create_test_context().await.unwrap();
    let (alpha, _, alpha_auth) = create_test_company(&ctx.resources, "Alpha", "a@alpha.test")
        .await
        .unwrap();
    let (beta, _, beta_auth) = create_test_company(&ctx.resources, "Beta", "b@beta.test")
        .await
        .unwrap();

    let thread = thread_id(alpha.id.as_str(), beta.id.as_str());
    for text in ["one", "two", "three"] {
        AxumTestRequest::post(&format!("/api/messages/{thread}"))
            .header("authorization", &alpha_auth)
            .json(&json!({"text": text}))
            .send(ctx.router())
            .await;
    }

    let texts = |list: &MessageListResponse| {
        list.messages
            .iter()
            .map(|m| m.text.clone())
            .collect::<Vec<_>>()
    };

    let first: MessageListResponse = AxumTestRequest::get(&format!("/api/messages/{thread}"))
        .header("authorization", &beta_auth)
        .send(ctx.router())
        .await
        .json();
    let second: MessageListResponse = AxumTestRequest::get(&format!("/api/messages/{thread}"))
        .header("authorization", &beta_auth)
        .send(ctx.router())
        .await
        .json();

    assert_eq!(texts(&first), vec!["one", "two", "three"]);
    assert_eq!(texts(&first), texts(&second));
}

// ============================================================================
// Boundary
// ============================================================================

#[tokio::test]
async fn test_messages_require_authentication() {
    let ctx = create_test_context().await.unwrap();

    let response = AxumTestRequest::get("/api/messages/threads")
        .send(ctx.router())
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = AxumTestRequest::post("/api/messages/thread-a-b")
        .json(&json!({"text": "hi"}))
        .send(ctx.router())
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = AxumTestRequest::get("/api/messages/thread-a-b")
        .header("authorization", "Bearer bogus")
        .send(ctx.router())
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}
