//! Domain service for authentication and user management.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Login result containing the username and API key.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub username: String,
    pub api_key: String,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Verifies an API key and returns the associated username if valid.
    async fn verify_api_key(&self, api_key: &str) -> Result<Option<String>, AuthError>;

    /// Creates a user, or resets an existing user's password and API key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for a blank username or a password
    /// shorter than 8 characters.
    async fn create_user(&self, username: &str, password: &str)
    -> Result<LoginResult, AuthError>;
}
