use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::constants::pagination::PER_PAGE;
use crate::db::Store;
use crate::services::{
    ArtistService, AuthService, FileStorage, LocalStorage, MediaLibrary, SeaOrmArtistService,
    SeaOrmAuthService, SeaOrmWorkService, WorkService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub storage: Arc<dyn FileStorage>,

    pub artist_service: Arc<dyn ArtistService>,

    pub work_service: Arc<dyn WorkService>,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let storage: Arc<dyn FileStorage> =
            Arc::new(LocalStorage::new(config.media.storage_path.clone()));
        Self::with_storage(config, storage).await
    }

    /// Builds the state around a caller-supplied file store.
    pub async fn with_storage(
        config: Config,
        storage: Arc<dyn FileStorage>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let media = Arc::new(MediaLibrary::new(storage.clone()));

        let artist_service: Arc<dyn ArtistService> = Arc::new(SeaOrmArtistService::new(
            store.clone(),
            media.clone(),
            PER_PAGE,
        ));

        let work_service: Arc<dyn WorkService> = Arc::new(SeaOrmWorkService::new(
            store.clone(),
            media,
            config.media.clone(),
            PER_PAGE,
        ));

        let auth_service: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(store.clone()));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            storage,
            artist_service,
            work_service,
            auth_service,
        })
    }
}
