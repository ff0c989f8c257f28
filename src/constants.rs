// ABOUTME: Application-wide constants organized by domain
// ABOUTME: Single source of truth for limits, service identity, and upload policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! Application constants

/// Service identity constants
pub mod service_names {
    /// Service name used in logs and the health endpoint
    pub const PROCURA_SERVER: &str = "procura-server";
}

/// Numeric limits and defaults
pub mod limits {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;

    /// Default JWT expiry in hours
    pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;

    /// Default per-file upload size bound (15 MiB)
    pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 15 * 1024 * 1024;

    /// Slack added on top of the per-file bound for the whole multipart body
    /// (fields + boundaries + several files)
    pub const UPLOAD_BODY_SLACK_BYTES: u64 = 5 * 1024 * 1024;
}

/// Attachment upload policy
pub mod uploads {
    /// Allow-list of attachment media types: documents and spreadsheets only
    pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
        "application/pdf",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "application/vnd.ms-excel",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "application/vnd.oasis.opendocument.text",
        "application/vnd.oasis.opendocument.spreadsheet",
        "text/csv",
        "text/plain",
    ];

    /// Subdirectory for request attachments beneath the uploads root
    pub const REQUEST_AREA: &str = "requests";

    /// Subdirectory for product attachments beneath the uploads root
    pub const PRODUCT_AREA: &str = "products";
}
