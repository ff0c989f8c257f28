// ABOUTME: Registration and login route handlers
// ABOUTME: Creates company accounts and issues JWT bearer tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! Authentication routes
//!
//! Registration creates the company and its first user in one step; login
//! verifies the password and issues the bearer token every other endpoint
//! requires.

use crate::errors::{AppError, AppResult};
use crate::server::ServerResources;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to register a company and its first user
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Login email
    pub email: String,
    /// Password (min 8 characters)
    pub password: String,
    /// Company display name
    #[serde(alias = "companyName")]
    pub company_name: String,
    /// Optional user display name
    #[serde(default, alias = "displayName")]
    pub display_name: Option<String>,
}

/// Response for a successful registration
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Created user id
    pub user_id: String,
    /// Created company id
    pub company_id: String,
    /// Human-readable confirmation
    pub message: String,
}

/// Request to log in
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
}

/// User info embedded in the login response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    /// User id
    pub user_id: String,
    /// Login email
    pub email: String,
    /// Optional display name
    pub display_name: Option<String>,
    /// Company the user acts for
    pub company_id: String,
}

/// Response for a successful login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token
    pub token: String,
    /// Token expiry (ISO 8601)
    pub expires_at: String,
    /// Authenticated user
    pub user: UserInfo,
}

// ============================================================================
// Auth Routes
// ============================================================================

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::register))
            .route("/api/auth/login", post(Self::login))
            .with_state(resources)
    }

    /// Register a company and its first user
    async fn register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        if !request.email.contains('@') {
            return Err(AppError::invalid_input("Invalid email address"));
        }
        if request.password.len() < 8 {
            return Err(AppError::invalid_input(
                "Password must be at least 8 characters",
            ));
        }
        if request.company_name.trim().is_empty() {
            return Err(AppError::invalid_input("Company name must not be empty"));
        }

        let users = resources.user_manager();

        if users.get_user_by_email(&request.email).await?.is_some() {
            return Err(AppError::new(
                crate::errors::ErrorCode::ResourceAlreadyExists,
                "A user with this email already exists",
            ));
        }

        let password_hash = hash_password(request.password).await?;

        let company = users.create_company(request.company_name.trim()).await?;
        let user = users
            .create_user(
                &request.email,
                &password_hash,
                request.display_name.as_deref(),
                &company.id,
            )
            .await?;

        info!(user_id = %user.id, company_id = %company.id, "User registered");

        let response = RegisterResponse {
            user_id: user.id.to_string(),
            company_id: company.id.into_string(),
            message: "Registration successful".into(),
        };

        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Log in and receive a bearer token
    async fn login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let users = resources.user_manager();

        let user = users
            .get_user_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid email or password"))?;

        if !verify_password(request.password, user.password_hash.clone()).await? {
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        users.update_last_active(user.id).await?;

        let token = resources
            .auth_manager
            .generate_token(&user)
            .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;
        let expires_at = chrono::Utc::now()
            + chrono::Duration::hours(resources.auth_manager.token_expiry_hours());

        info!(user_id = %user.id, "User logged in");

        let response = LoginResponse {
            token,
            expires_at: expires_at.to_rfc3339(),
            user: UserInfo {
                user_id: user.id.to_string(),
                email: user.email,
                display_name: user.display_name,
                company_id: user.company_id.into_string(),
            },
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }
}

/// Hash a password off the async executor
async fn hash_password(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Password hashing error: {e}")))
}

/// Verify a password off the async executor
async fn verify_password(password: String, password_hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Password verification error: {e}")))
}
