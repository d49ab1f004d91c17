//! `SeaORM` implementation of the `AuthService` trait.

use crate::db::Store;
use crate::services::auth_service::{AuthError, AuthService, LoginResult};
use async_trait::async_trait;

pub struct SeaOrmAuthService {
    store: Store,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let user = self
            .store
            .verify_user_password(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(LoginResult {
            username: user.username,
            api_key: user.api_key,
        })
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<Option<String>, AuthError> {
        let user = self.store.verify_api_key(api_key).await?;
        Ok(user.map(|u| u.username))
    }

    async fn create_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResult, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::Validation("Username cannot be empty".to_string()));
        }

        if password.len() < 8 {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let user = self.store.upsert_user(username, password).await?;

        Ok(LoginResult {
            username: user.username,
            api_key: user.api_key,
        })
    }
}
