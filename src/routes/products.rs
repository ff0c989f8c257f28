// ABOUTME: Product catalog route handlers
// ABOUTME: Products carry the document sets that requests inherit by value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! Product routes
//!
//! Minimal catalog surface: create a product with its documents, list the
//! caller's own products. Request creation references products by id to
//! inherit their files. All handlers require JWT authentication.

use super::uploads;
use crate::errors::AppError;
use crate::models::Product;
use crate::server::ServerResources;
use crate::storage::UploadArea;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Response for the product listing
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductListResponse {
    /// The caller's products, newest first
    pub products: Vec<Product>,
    /// Total count
    pub total: usize,
}

/// Product routes handler
pub struct ProductRoutes;

impl ProductRoutes {
    /// Create all product routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/products", post(Self::create_product))
            .route("/api/products", get(Self::list_products))
            .with_state(resources)
    }

    /// Create a product from a multipart submission
    async fn create_product(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        mut multipart: Multipart,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers)?;

        let form =
            uploads::collect(&mut multipart, &resources.storage, UploadArea::Products).await?;

        let Some(name) = form.first("name").map(ToOwned::to_owned) else {
            resources.storage.delete_all_quietly(&form.files).await;
            return Err(AppError::invalid_input("Product name must not be empty"));
        };
        let description = form.first("description").map(ToOwned::to_owned);

        let product = resources
            .product_manager()
            .create(&auth.company_id, &name, description.as_deref(), &form.files)
            .await?;

        Ok((StatusCode::CREATED, Json(product)).into_response())
    }

    /// List the caller's products
    async fn list_products(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers)?;

        let products = resources
            .product_manager()
            .list_for_company(&auth.company_id)
            .await?;

        let total = products.len();
        Ok((StatusCode::OK, Json(ProductListResponse { products, total })).into_response())
    }
}
