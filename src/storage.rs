// ABOUTME: Local attachment storage with request and product upload areas
// ABOUTME: Store/read/delete by relative path; cleanup is best-effort and logged
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! # File Storage
//!
//! Persists uploaded attachments beneath one uploads root, split into a
//! `requests/` and a `products/` area. Records only ever hold paths relative
//! to the root, so the root can move between environments.
//!
//! Cleanup is intentionally decoupled from record mutations: deleting a
//! record succeeds even when the attachment files cannot be removed, and
//! those failures are logged rather than propagated.

use crate::constants::uploads;
use crate::errors::{AppError, AppResult};
use crate::models::FileAttachment;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Which upload area a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadArea {
    /// Request attachments (uploads and response files)
    Requests,
    /// Product catalog attachments
    Products,
}

impl UploadArea {
    const fn subdir(self) -> &'static str {
        match self {
            Self::Requests => uploads::REQUEST_AREA,
            Self::Products => uploads::PRODUCT_AREA,
        }
    }
}

/// Attachment storage collaborator over the local filesystem
#[derive(Clone)]
pub struct FileStorage {
    root: PathBuf,
    max_file_size_bytes: u64,
}

impl FileStorage {
    /// Create a storage handle rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, max_file_size_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_file_size_bytes,
        }
    }

    /// Create the upload area directories
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a directory cannot be created.
    pub async fn init(&self) -> AppResult<()> {
        for area in [UploadArea::Requests, UploadArea::Products] {
            tokio::fs::create_dir_all(self.root.join(area.subdir()))
                .await
                .map_err(|e| {
                    AppError::storage(format!("Failed to create upload area: {e}")).with_source(e)
                })?;
        }
        Ok(())
    }

    /// Check an upload against the attachment policy.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFileType` for media types outside the allow-list
    /// and `FileTooLarge` for files over the configured bound.
    pub fn validate_upload(&self, name: &str, content_type: &str, size: u64) -> AppResult<()> {
        // Strip parameters like "; charset=utf-8" before matching
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim();

        if !uploads::ALLOWED_CONTENT_TYPES.contains(&media_type) {
            return Err(AppError::unsupported_file_type(format!(
                "'{name}' has media type {media_type}; only documents and spreadsheets are accepted"
            )));
        }

        if size > self.max_file_size_bytes {
            return Err(AppError::file_too_large(format!(
                "'{name}' is {size} bytes; the limit is {} bytes",
                self.max_file_size_bytes
            )));
        }

        Ok(())
    }

    /// Persist an upload and return its attachment metadata.
    ///
    /// The stored filename is prefixed with a fresh id so uploads never
    /// collide; the original name survives in the metadata only.
    ///
    /// # Errors
    ///
    /// Returns the policy errors from [`Self::validate_upload`] or
    /// `StorageError` when the write fails.
    pub async fn store(
        &self,
        area: UploadArea,
        original_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> AppResult<FileAttachment> {
        self.validate_upload(original_name, content_type, data.len() as u64)?;

        let safe_name = sanitize_filename(original_name);
        let file_id = Uuid::new_v4().to_string();
        let storage_path = format!("{}/{file_id}_{safe_name}", area.subdir());

        tokio::fs::write(self.root.join(&storage_path), data)
            .await
            .map_err(|e| {
                AppError::storage(format!("Failed to write '{original_name}': {e}")).with_source(e)
            })?;

        debug!(path = %storage_path, size = data.len(), "Stored attachment");

        Ok(FileAttachment {
            id: file_id,
            name: original_name.to_owned(),
            storage_path,
            content_type: content_type.to_owned(),
            size: data.len() as i64,
        })
    }

    /// Resolve a stored path to an absolute filesystem path.
    ///
    /// Legacy fallback: a path that does not indicate the request upload
    /// area is looked up under the product area instead. Inherited product
    /// files and records predating the area split both resolve this way.
    #[must_use]
    pub fn resolve(&self, stored_path: &str) -> PathBuf {
        if stored_path.starts_with(uploads::REQUEST_AREA) {
            self.root.join(stored_path)
        } else {
            let name = Path::new(stored_path)
                .file_name()
                .map_or_else(|| stored_path.into(), ToOwned::to_owned);
            self.root.join(uploads::PRODUCT_AREA).join(name)
        }
    }

    /// Read an attachment's bytes
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the file is absent and
    /// `StorageError` for other I/O failures.
    pub async fn read(&self, stored_path: &str) -> AppResult<Vec<u8>> {
        let path = self.resolve(stored_path);
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found("Attachment file")
            } else {
                AppError::storage(format!("Failed to read attachment: {e}")).with_source(e)
            }
        })
    }

    /// Delete one stored file, logging (not propagating) failures
    pub async fn delete_quietly(&self, stored_path: &str) {
        let path = self.resolve(stored_path);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Attachment cleanup failed");
            }
        }
    }

    /// Delete a whole attachment set, best-effort per file
    pub async fn delete_all_quietly(&self, files: &[FileAttachment]) {
        for file in files {
            self.delete_quietly(&file.storage_path).await;
        }
    }
}

/// Keep only characters that are safe in a stored filename
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "file".into()
    } else {
        cleaned
    }
}
