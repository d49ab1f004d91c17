use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::MediaConfig;
use crate::state::SharedState;

mod artists;
pub mod auth;
mod error;
pub mod flash;
pub mod forms;
mod home;
mod observability;
pub mod types;
mod works;

pub use error::ApiError;
pub use types::*;

use crate::services::{ArtistService, AuthService, WorkService};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    /// Media settings captured at startup; URLs are built from `public_path`.
    pub media: MediaConfig,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn artist_service(&self) -> &Arc<dyn ArtistService> {
        &self.shared.artist_service
    }

    #[must_use]
    pub fn work_service(&self) -> &Arc<dyn WorkService> {
        &self.shared.work_service
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn public_path(&self) -> &str {
        &self.media.public_path
    }
}

pub async fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    let media = shared.config.read().await.media.clone();

    Arc::new(AppState {
        shared,
        media,
        prometheus_handle,
    })
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (server, body_limit) = {
        let config = state.shared.config.read().await;
        (config.server.clone(), config.media.max_request_bytes())
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )));

    let cors_layer = if server.cors_allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = server
            .cors_allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    let storage = ServeDir::new(&state.media.storage_path);
    let public_path = state.media.public_path.clone();

    Router::new()
        .merge(create_protected_router(state.clone()))
        .merge(create_public_router())
        .nest_service(&public_path, storage)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(session_layer)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home::index))
        .route("/works/{id}", get(works::show))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/work", get(works::index))
        .route("/works/create", get(works::create))
        .route("/works", post(works::store))
        .route("/works/{id}/edit", get(works::edit))
        .route("/works/{id}", patch(works::update).delete(works::destroy))
        .route("/artist", get(artists::index))
        .route("/artists/create", get(artists::create))
        .route("/artists", post(artists::store))
        .route("/artists/{id}/edit", get(artists::edit))
        .route("/artists/{id}", patch(artists::update).delete(artists::destroy))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::auth_middleware,
        ))
}
