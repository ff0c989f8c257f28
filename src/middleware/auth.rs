// ABOUTME: Bearer-token authentication middleware for REST requests
// ABOUTME: Resolves the Authorization header to an AuthResult or a 401
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! Authentication middleware
//!
//! Every protected handler calls [`AuthMiddleware::authenticate_request`]
//! first; failures surface as `Unauthorized` before any core logic runs.

use crate::auth::{AuthManager, AuthResult};
use crate::errors::{AppError, AppResult};
use axum::http::HeaderMap;
use std::sync::Arc;

/// Middleware for bearer-credential authentication
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: Arc<AuthManager>,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub const fn new(auth_manager: Arc<AuthManager>) -> Self {
        Self { auth_manager }
    }

    /// Authenticate a request from its headers.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when no `Authorization` header is present and
    /// `AuthInvalid` when the bearer token does not validate.
    pub fn authenticate_request(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let header = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::auth_required)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::auth_invalid("Authorization header must be a bearer token"))?;

        self.auth_manager
            .validate_token(token)
            .map_err(|e| AppError::auth_invalid(format!("Authentication failed: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn middleware() -> AuthMiddleware {
        AuthMiddleware::new(Arc::new(AuthManager::new("test-secret", 1)))
    }

    #[test]
    fn missing_header_is_auth_required() {
        let err = middleware()
            .authenticate_request(&HeaderMap::new())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);
    }

    #[test]
    fn non_bearer_header_is_auth_invalid() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Basic dXNlcjpwYXNz".parse().unwrap());
        let err = middleware().authenticate_request(&headers).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthInvalid);
    }

    #[test]
    fn invalid_token_is_auth_invalid() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer bogus".parse().unwrap());
        let err = middleware().authenticate_request(&headers).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthInvalid);
    }
}
