// ABOUTME: JWT-based user authentication for the bearer-credential boundary
// ABOUTME: Generates and validates tokens carrying the user id and company id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! # Authentication
//!
//! JWT bearer tokens signed with HS256. Every claim set carries the user id
//! and the company id the user acts for; the rest of the server only ever
//! consumes the validated `AuthResult`.

use crate::models::{CompanyId, User};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired,
    /// Token signature is invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper JWT format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl std::fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenExpired => write!(f, "JWT token has expired"),
            Self::TokenInvalid { reason } => {
                write!(f, "JWT token signature is invalid: {reason}")
            }
            Self::TokenMalformed { details } => {
                write!(f, "JWT token is malformed: {details}")
            }
        }
    }
}

impl std::error::Error for JwtValidationError {}

/// JWT claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// User email
    pub email: String,
    /// Company the user acts for
    pub company: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Authenticated caller context
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Authenticated user id
    pub user_id: Uuid,
    /// Company the caller acts for
    pub company_id: CompanyId,
}

/// Authentication manager for JWT tokens
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new authentication manager from the shared signing secret
    #[must_use]
    pub fn new(secret: &str, token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry_hours,
        }
    }

    /// Generate a JWT token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails.
    pub fn generate_token(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            company: user.company_id.as_str().to_owned(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Validate a token and extract the caller context
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] if the token is expired, has an
    /// invalid signature, or does not carry a well-formed user id.
    pub fn validate_token(&self, token: &str) -> Result<AuthResult, JwtValidationError> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    JwtValidationError::TokenExpired
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    JwtValidationError::TokenInvalid {
                        reason: e.to_string(),
                    }
                }
                _ => JwtValidationError::TokenMalformed {
                    details: e.to_string(),
                },
            }
        })?;

        let user_id =
            Uuid::parse_str(&data.claims.sub).map_err(|e| JwtValidationError::TokenMalformed {
                details: format!("sub claim is not a user id: {e}"),
            })?;

        Ok(AuthResult {
            user_id,
            company_id: CompanyId::new(data.claims.company),
        })
    }

    /// Token lifetime in hours, for expiry reporting at login
    #[must_use]
    pub const fn token_expiry_hours(&self) -> i64 {
        self.token_expiry_hours
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "buyer@example.com".into(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".into(),
            display_name: None,
            company_id: CompanyId::generate(),
            created_at: Utc::now().to_rfc3339(),
            last_active: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn generated_token_validates_back_to_the_same_caller() {
        let manager = AuthManager::new("test-secret", 24);
        let user = test_user();

        let token = manager.generate_token(&user).unwrap();
        let auth = manager.validate_token(&token).unwrap();

        assert_eq!(auth.user_id, user.id);
        assert_eq!(auth.company_id, user.company_id);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let manager = AuthManager::new("test-secret", 24);
        let other = AuthManager::new("other-secret", 24);
        let token = other.generate_token(&test_user()).unwrap();

        assert!(manager.validate_token(&token).is_err());
    }

    #[test]
    fn garbage_token_is_malformed() {
        let manager = AuthManager::new("test-secret", 24);
        let err = manager.validate_token("not-a-jwt").unwrap_err();
        assert!(matches!(err, JwtValidationError::TokenMalformed { .. }));
    }
}
