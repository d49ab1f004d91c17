use axum::{
    Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::forms::FormPayload;
use super::types::PageView;
use super::{ApiError, AppState, flash};
use crate::constants::session::USER_KEY;
use crate::validation::{Rule, RuleSet};

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware that checks:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
///
/// Anything else is redirected to the login page before the handler runs.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    if let Ok(Some(user)) = session.get::<String>(USER_KEY).await {
        tracing::Span::current().record("user_id", &user);
        return next.run(request).await;
    }

    if let Some(key) = extract_api_key(&headers) {
        match state.auth_service().verify_api_key(&key).await {
            Ok(Some(user)) => {
                tracing::Span::current().record("user_id", &user);
                return next.run(request).await;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "API key verification failed"),
        }
    }

    ApiError::Unauthenticated.into_response()
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Serialize)]
pub struct LoginProps {}

/// GET /login
pub async fn login_page(session: Session) -> Json<PageView<LoginProps>> {
    Json(PageView::new("auth/Login", "/login", LoginProps {}).with_flash(flash::take(&session).await))
}

/// POST /login
/// Starts a session for valid credentials and redirects to the work index.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    FormPayload(input): FormPayload,
) -> Result<Redirect, ApiError> {
    RuleSet::new()
        .field("username", vec![Rule::Required, Rule::String])
        .field("password", vec![Rule::Required, Rule::String])
        .validate(&input, state.store())
        .await?;

    let username = input.text("username").unwrap_or_default();
    let password = input.text("password").unwrap_or_default();

    let result = state.auth_service().login(username, password).await?;

    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to rotate session: {e}")))?;
    session
        .insert(USER_KEY, &result.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    tracing::info!(user = %result.username, "User logged in");
    Ok(Redirect::to("/work"))
}

/// POST /logout
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to flush session");
    }
    Redirect::to("/")
}
