pub mod artist_service;
pub mod artist_service_impl;
pub use artist_service::{ArtistError, ArtistService};
pub use artist_service_impl::SeaOrmArtistService;

pub mod work_service;
pub mod work_service_impl;
pub use work_service::{WorkError, WorkForm, WorkService};
pub use work_service_impl::SeaOrmWorkService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult};
pub use auth_service_impl::SeaOrmAuthService;

pub mod media;
pub use media::{MediaError, MediaLibrary};

pub mod storage;
pub use storage::{FileStorage, LocalStorage, StorageError};

/// Counts a successful catalog write.
pub fn record_mutation(entity: &'static str, action: &'static str) {
    metrics::counter!("catalog_mutations_total", "entity" => entity, "action" => action)
        .increment(1);
}
