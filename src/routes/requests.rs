// ABOUTME: Procurement request route handlers with fan-out creation and attachments
// ABOUTME: Create, respond, download, and delete with per-recipient result reporting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! Request lifecycle routes
//!
//! A bulk submission fans out into one independent `RequestRecord` per
//! recipient; the 201 response reports a per-recipient outcome list instead
//! of all-or-nothing semantics. Attachments are either uploaded with the
//! submission or inherited by value from a referenced product. All handlers
//! require JWT authentication.

use super::uploads::{self, UploadedForm};
use crate::constants::uploads::REQUEST_AREA;
use crate::database::RecipientOutcome;
use crate::errors::{AppError, ErrorResponseDetails};
use crate::models::{CompanyId, FileAttachment, RequestRecord, RequestStatus};
use crate::server::ServerResources;
use crate::storage::UploadArea;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for the sent/received listings
#[derive(Debug, Serialize, Deserialize)]
pub struct RequestListResponse {
    /// Matching records, newest first
    pub requests: Vec<RequestRecord>,
    /// Total count
    pub total: usize,
}

/// One recipient's slice of a fan-out creation result
#[derive(Debug, Serialize, Deserialize)]
pub struct FanoutEntry {
    /// The recipient this entry is about
    pub recipient_company_id: String,
    /// "created" or "failed"
    pub status: String,
    /// The created record, when successful
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestRecord>,
    /// The failure, when not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponseDetails>,
}

/// Response for a fan-out creation
#[derive(Debug, Serialize, Deserialize)]
pub struct FanoutResponse {
    /// One entry per recipient, in submission order
    pub results: Vec<FanoutEntry>,
    /// How many records were created
    pub created: usize,
    /// How many recipients failed
    pub failed: usize,
}

/// Validated inputs for a fan-out creation
struct CreateParams {
    recipients: Vec<CompanyId>,
    subject: String,
    text: String,
    files: Vec<FileAttachment>,
    product_id: Option<String>,
}

/// Validated inputs for a response
struct RespondParams {
    status: RequestStatus,
    response_text: String,
}

// ============================================================================
// Request Routes
// ============================================================================

/// Request lifecycle routes handler
pub struct RequestRoutes;

impl RequestRoutes {
    /// Create all request routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/requests", post(Self::create_request))
            .route("/api/requests/sent", get(Self::list_sent))
            .route("/api/requests/received", get(Self::list_received))
            .route("/api/requests/download/:id/:file_id", get(Self::download_attachment))
            .route("/api/requests/:id", get(Self::get_request))
            .route("/api/requests/:id", put(Self::respond_to_request))
            .route("/api/requests/:id", delete(Self::delete_request))
            .with_state(resources)
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// List requests the caller's company has sent
    async fn list_sent(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers)?;

        let requests = resources
            .request_manager()
            .list_sent(&auth.company_id)
            .await?;

        let total = requests.len();
        Ok((StatusCode::OK, Json(RequestListResponse { requests, total })).into_response())
    }

    /// List requests the caller's company has received
    async fn list_received(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers)?;

        let requests = resources
            .request_manager()
            .list_received(&auth.company_id)
            .await?;

        let total = requests.len();
        Ok((StatusCode::OK, Json(RequestListResponse { requests, total })).into_response())
    }

    /// Get a single request; participants only
    async fn get_request(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(request_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers)?;

        let request = resources
            .request_manager()
            .get(&request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request"))?;

        require_participant(&request, &auth.company_id)?;

        Ok((StatusCode::OK, Json(request)).into_response())
    }

    // ========================================================================
    // Creation (fan-out)
    // ========================================================================

    /// Create one request per recipient from a multipart submission
    async fn create_request(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        mut multipart: Multipart,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers)?;

        let form =
            uploads::collect(&mut multipart, &resources.storage, UploadArea::Requests).await?;

        // Fatal validation from here on must not leave orphaned uploads
        let params = match Self::prepare_create(&resources, &form).await {
            Ok(params) => params,
            Err(e) => {
                resources.storage.delete_all_quietly(&form.files).await;
                return Err(e);
            }
        };

        let outcomes = resources
            .request_manager()
            .create_fanout(
                &auth.company_id,
                &params.recipients,
                &params.subject,
                &params.text,
                &params.files,
                params.product_id.as_deref(),
            )
            .await?;

        let results: Vec<FanoutEntry> = outcomes.into_iter().map(fanout_entry).collect();
        let created = results.iter().filter(|r| r.status == "created").count();
        let failed = results.len() - created;

        info!(
            sender = %auth.company_id,
            created,
            failed,
            "Request fan-out complete"
        );

        let response = FanoutResponse {
            results,
            created,
            failed,
        };

        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Validate the submission and resolve subject and file inheritance
    async fn prepare_create(
        resources: &ServerResources,
        form: &UploadedForm,
    ) -> Result<CreateParams, AppError> {
        let text = form
            .first("text")
            .ok_or_else(|| AppError::invalid_input("Request text must not be empty"))?
            .to_owned();

        let recipients = parse_recipients(form)?;
        if recipients.is_empty() {
            return Err(AppError::invalid_input("At least one recipient is required"));
        }

        let product_id = form
            .first("productId")
            .or_else(|| form.first("product_id"))
            .map(ToOwned::to_owned);

        let product = match &product_id {
            Some(id) => Some(
                resources
                    .product_manager()
                    .get(id)
                    .await?
                    .ok_or_else(|| AppError::invalid_input("Referenced product not found"))?,
            ),
            None => None,
        };

        let subject = form
            .first("subject")
            .map(ToOwned::to_owned)
            .or_else(|| product.as_ref().map(|p| p.name.clone()))
            .ok_or_else(|| {
                AppError::invalid_input("Subject is required when no product is referenced")
            })?;

        // Manual uploads always take precedence over inherited product files
        let files = if form.files.is_empty() {
            product.map(|p| p.files).unwrap_or_default()
        } else {
            form.files.clone()
        };

        Ok(CreateParams {
            recipients,
            subject,
            text,
            files,
            product_id,
        })
    }

    // ========================================================================
    // Response
    // ========================================================================

    /// Record the recipient's response, replacing any earlier response files
    async fn respond_to_request(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(request_id): Path<String>,
        mut multipart: Multipart,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers)?;

        let request = resources
            .request_manager()
            .get(&request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request"))?;

        if request.recipient_company_id != auth.company_id {
            return Err(AppError::forbidden(
                "Only the recipient may respond to a request",
            ));
        }

        let form =
            uploads::collect(&mut multipart, &resources.storage, UploadArea::Requests).await?;

        let params = match Self::validate_response(&form) {
            Ok(params) => params,
            Err(e) => {
                resources.storage.delete_all_quietly(&form.files).await;
                return Err(e);
            }
        };

        // New response files destructively replace the previous set
        let response_files = if form.files.is_empty() {
            request.response_files.clone()
        } else {
            resources
                .storage
                .delete_all_quietly(&request.response_files)
                .await;
            form.files.clone()
        };

        let updated = resources
            .request_manager()
            .respond(
                &request_id,
                params.status,
                &params.response_text,
                &response_files,
            )
            .await?;

        info!(
            request_id = %request_id,
            status = params.status.as_str(),
            "Request responded"
        );

        Ok((StatusCode::OK, Json(updated)).into_response())
    }

    /// Validate the response fields
    fn validate_response(form: &UploadedForm) -> Result<RespondParams, AppError> {
        let status_raw = form
            .first("status")
            .ok_or_else(|| AppError::invalid_input("Status is required"))?;

        let status = match RequestStatus::parse(status_raw) {
            Some(RequestStatus::Accepted) => RequestStatus::Accepted,
            Some(RequestStatus::Rejected) => RequestStatus::Rejected,
            _ => {
                return Err(AppError::invalid_input(
                    "Status must be 'accepted' or 'rejected'",
                ))
            }
        };

        let response_text = form
            .first("response")
            .ok_or_else(|| AppError::invalid_input("Response text must not be empty"))?
            .to_owned();

        Ok(RespondParams {
            status,
            response_text,
        })
    }

    // ========================================================================
    // Attachments
    // ========================================================================

    /// Stream an attachment to a participant
    async fn download_attachment(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path((request_id, file_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers)?;

        let request = resources
            .request_manager()
            .get(&request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request"))?;

        require_participant(&request, &auth.company_id)?;

        let file = request
            .files
            .iter()
            .chain(request.response_files.iter())
            .find(|f| f.id == file_id)
            .ok_or_else(|| AppError::not_found("Attachment"))?;

        let data = resources.storage.read(&file.storage_path).await?;

        let disposition = format!(
            "attachment; filename=\"{}\"",
            file.name.replace(['"', '\r', '\n'], "_")
        );

        Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, file.content_type.clone()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            data,
        )
            .into_response())
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Delete a request; either participant may, cleanup is best-effort
    async fn delete_request(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(request_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers)?;

        let request = resources
            .request_manager()
            .get(&request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request"))?;

        require_participant(&request, &auth.company_id)?;

        let deleted = resources.request_manager().delete(&request_id).await?;
        if !deleted {
            return Err(AppError::not_found("Request"));
        }

        // Inherited product files are pointers into the catalog area; only
        // this request's own uploads are cleaned up
        let own_uploads: Vec<FileAttachment> = request
            .files
            .iter()
            .chain(request.response_files.iter())
            .filter(|f| f.storage_path.starts_with(REQUEST_AREA))
            .cloned()
            .collect();
        resources.storage.delete_all_quietly(&own_uploads).await;

        info!(request_id = %request_id, by = %auth.company_id, "Request deleted");

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

/// Fail with `PermissionDenied` unless the company is sender or recipient
fn require_participant(request: &RequestRecord, company: &CompanyId) -> Result<(), AppError> {
    if request.sender_company_id == *company || request.recipient_company_id == *company {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "Only request participants may access this record",
        ))
    }
}

/// Parse the recipient set from the form.
///
/// Accepts repeated plain-string fields, a JSON array (of raw ids or
/// structured references), or a single structured reference, under any of
/// the field spellings clients use.
fn parse_recipients(form: &UploadedForm) -> Result<Vec<CompanyId>, AppError> {
    let mut recipients = Vec::new();

    for key in ["recipients", "recipientCompanyIds", "recipient_company_ids"] {
        for raw in form.values(key) {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }

            if trimmed.starts_with('[') {
                let parsed: Vec<CompanyId> = serde_json::from_str(trimmed).map_err(|e| {
                    AppError::invalid_input(format!("Invalid recipient list: {e}"))
                })?;
                recipients.extend(parsed);
            } else if trimmed.starts_with('{') {
                let parsed: CompanyId = serde_json::from_str(trimmed).map_err(|e| {
                    AppError::invalid_input(format!("Invalid recipient reference: {e}"))
                })?;
                recipients.push(parsed);
            } else {
                recipients.push(CompanyId::new(trimmed));
            }
        }
    }

    // Duplicate recipients would create duplicate records; keep first-seen order
    let mut seen = HashSet::new();
    recipients.retain(|r| seen.insert(r.clone()));

    Ok(recipients)
}

/// Map a manager outcome onto the wire shape
fn fanout_entry(outcome: RecipientOutcome) -> FanoutEntry {
    match outcome {
        RecipientOutcome::Created(record) => FanoutEntry {
            recipient_company_id: record.recipient_company_id.as_str().to_owned(),
            status: "created".into(),
            request: Some(record),
            error: None,
        },
        RecipientOutcome::Failed { recipient, error } => FanoutEntry {
            recipient_company_id: recipient.into_string(),
            status: "failed".into(),
            request: None,
            error: Some(ErrorResponseDetails {
                code: error.code,
                message: error.message,
            }),
        },
    }
}
