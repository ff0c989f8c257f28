// ABOUTME: Core data models for companies, users, messages, requests, and products
// ABOUTME: Defines the canonical CompanyId value type that normalizes mixed id representations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! # Data Models
//!
//! Common data structures shared by the database managers and HTTP routes.
//! `CompanyId` is the canonical company identifier: every boundary input is
//! normalized to it immediately, so downstream code never compares mixed
//! representations.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Company Identity
// ============================================================================

/// Canonical company identifier.
///
/// Clients send company ids either as a raw string (`"64a1..."`) or as a
/// structured reference (`{"id": "64a1..."}`, legacy payloads use `"_id"`).
/// Deserialization accepts both and normalizes to the plain string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CompanyId(String);

impl CompanyId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier.
    ///
    /// Uses the dash-free UUID simple form so thread keys built from two ids
    /// always decompose into exactly two segments.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// The canonical string form
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the canonical string form
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CompanyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CompanyId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl<'de> Deserialize<'de> for CompanyId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct StructuredRef {
            #[serde(alias = "_id")]
            id: String,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Raw(String),
            Structured(StructuredRef),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Raw(id) => Ok(Self(id)),
            Repr::Structured(r) => Ok(Self(r.id)),
        }
    }
}

// ============================================================================
// Companies and Users
// ============================================================================

/// A registered company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Company identifier
    pub id: CompanyId,
    /// Display name
    pub name: String,
    /// When the company was created (ISO 8601)
    pub created_at: String,
}

/// A platform user belonging to a company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    pub id: Uuid,
    /// Login email, unique
    pub email: String,
    /// bcrypt password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Optional display name
    pub display_name: Option<String>,
    /// Company the user acts for
    pub company_id: CompanyId,
    /// When the user was created (ISO 8601)
    pub created_at: String,
    /// Last login or API activity (ISO 8601)
    pub last_active: String,
}

// ============================================================================
// Messaging
// ============================================================================

/// A single message inside a two-party thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier
    pub id: String,
    /// Thread key this message belongs to
    pub thread_id: String,
    /// Sending company
    pub sender_company_id: CompanyId,
    /// Receiving company; None when counterpart derivation failed
    pub recipient_company_id: Option<CompanyId>,
    /// Message body
    pub text: String,
    /// Whether the recipient has listed the thread since this arrived
    pub read: bool,
    /// When the message was created (ISO 8601)
    pub created_at: String,
}

/// Per-thread summary: the most recent message plus unread count for the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
    /// Thread key
    pub thread_id: String,
    /// Sender of the latest message
    pub sender_company_id: CompanyId,
    /// Recipient of the latest message
    pub recipient_company_id: Option<CompanyId>,
    /// Latest message text
    pub text: String,
    /// Latest message timestamp (ISO 8601)
    pub last_message_at: String,
    /// Messages in this thread addressed to the caller and still unread
    pub unread_count: i64,
}

// ============================================================================
// Attachments
// ============================================================================

/// Metadata for one stored attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    /// Attachment identifier (unique per owning record)
    pub id: String,
    /// Original filename as uploaded
    pub name: String,
    /// Path relative to the uploads root
    pub storage_path: String,
    /// Media type as uploaded
    pub content_type: String,
    /// Size in bytes
    pub size: i64,
}

impl FileAttachment {
    /// Copy this attachment's metadata under a fresh id.
    ///
    /// The storage path is reused as a pointer; only the identity is new.
    /// This is how product files are inherited by value into a request.
    #[must_use]
    pub fn copied(&self) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: self.name.clone(),
            storage_path: self.storage_path.clone(),
            content_type: self.content_type.clone(),
            size: self.size,
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Lifecycle state of a request record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting a response from the recipient
    Pending,
    /// Recipient accepted
    Accepted,
    /// Recipient rejected
    Rejected,
}

impl RequestStatus {
    /// Stable string form used in storage and on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Parse from the stored string form
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// One sender → recipient request with its own lifecycle.
///
/// A bulk submission fans out into one of these per recipient; they are
/// fully independent afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Request identifier
    pub id: String,
    /// Sending company
    pub sender_company_id: CompanyId,
    /// Receiving company
    pub recipient_company_id: CompanyId,
    /// Subject line (taken from the referenced product when omitted)
    pub subject: String,
    /// Request body
    pub text: String,
    /// Attachments, uploaded or inherited from the referenced product
    pub files: Vec<FileAttachment>,
    /// Optional product this request refers to
    pub product_id: Option<String>,
    /// Lifecycle state
    pub status: RequestStatus,
    /// Recipient's response text, set once responded
    pub response: Option<String>,
    /// Attachments supplied with the response
    pub response_files: Vec<FileAttachment>,
    /// When the recipient responded (ISO 8601)
    pub responded_at: Option<String>,
    /// When the request was created (ISO 8601)
    pub created_at: String,
    /// Last mutation timestamp (ISO 8601)
    pub updated_at: String,
}

// ============================================================================
// Products
// ============================================================================

/// A catalog product whose files can be inherited by requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub id: String,
    /// Owning company
    pub company_id: CompanyId,
    /// Product name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Attached documents
    pub files: Vec<FileAttachment>,
    /// When the product was created (ISO 8601)
    pub created_at: String,
}
