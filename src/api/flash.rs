use axum::response::Redirect;
use tower_sessions::Session;
use tracing::warn;

use super::types::Flash;
use crate::constants::session::FLASH_KEY;

/// Stores a success message for the next page view and redirects to `to`.
pub async fn redirect_with(session: &Session, to: &str, message: &str) -> Redirect {
    let flash = Flash {
        success: message.to_string(),
    };

    if let Err(e) = session.insert(FLASH_KEY, flash).await {
        warn!(error = %e, "Failed to store flash message");
    }

    Redirect::to(to)
}

/// Reads and clears the pending flash message.
pub async fn take(session: &Session) -> Option<Flash> {
    session.remove::<Flash>(FLASH_KEY).await.ok().flatten()
}
