// ABOUTME: Multipart form collection shared by the attachment-carrying routes
// ABOUTME: Stores file parts as they stream in and cleans them up on failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

use crate::errors::{AppError, AppResult};
use crate::models::FileAttachment;
use crate::storage::{FileStorage, UploadArea};
use axum::extract::Multipart;
use std::collections::HashMap;

/// A fully collected multipart form: repeated text fields plus stored files
pub struct UploadedForm {
    fields: HashMap<String, Vec<String>>,
    /// Files already persisted to storage, in upload order
    pub files: Vec<FileAttachment>,
}

impl UploadedForm {
    /// First value of a text field, if present and non-empty
    pub fn first(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// All values of a repeated text field
    pub fn values(&self, name: &str) -> &[String] {
        self.fields.get(name).map_or(&[], Vec::as_slice)
    }
}

/// Drain a multipart body, persisting every file part as it arrives.
///
/// File parts are validated against the upload policy and stored under
/// `area`. Any failure deletes the files stored so far before returning, so
/// a rejected submission never leaves orphaned attachments behind.
///
/// # Errors
///
/// Returns the policy errors from the storage collaborator, or
/// `InvalidInput` when the body itself cannot be read.
pub async fn collect(
    multipart: &mut Multipart,
    storage: &FileStorage,
    area: UploadArea,
) -> AppResult<UploadedForm> {
    let mut form = UploadedForm {
        fields: HashMap::new(),
        files: Vec::new(),
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                storage.delete_all_quietly(&form.files).await;
                return Err(AppError::invalid_input(format!(
                    "Failed to read multipart body: {e}"
                )));
            }
        };

        let name = field.name().unwrap_or_default().to_owned();

        if let Some(file_name) = field.file_name().map(ToOwned::to_owned) {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();

            let data = match field.bytes().await {
                Ok(data) => data,
                Err(e) => {
                    storage.delete_all_quietly(&form.files).await;
                    return Err(AppError::invalid_input(format!(
                        "Failed to read file part '{file_name}': {e}"
                    )));
                }
            };

            match storage.store(area, &file_name, &content_type, &data).await {
                Ok(stored) => form.files.push(stored),
                Err(e) => {
                    storage.delete_all_quietly(&form.files).await;
                    return Err(e);
                }
            }
        } else {
            let value = match field.text().await {
                Ok(value) => value,
                Err(e) => {
                    storage.delete_all_quietly(&form.files).await;
                    return Err(AppError::invalid_input(format!(
                        "Failed to read field '{name}': {e}"
                    )));
                }
            };
            form.fields.entry(name).or_default().push(value);
        }
    }

    Ok(form)
}
