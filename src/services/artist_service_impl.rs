//! `SeaORM` implementation of the `ArtistService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::domain::{ArtistId, Page, PageNumber};
use crate::models::artist::Artist;
use crate::services::artist_service::{ArtistError, ArtistService};
use crate::services::media::MediaLibrary;
use crate::services::record_mutation;
use crate::validation::{self, FormInput};

pub struct SeaOrmArtistService {
    store: Store,
    media: Arc<MediaLibrary>,
    per_page: u64,
}

impl SeaOrmArtistService {
    #[must_use]
    pub const fn new(store: Store, media: Arc<MediaLibrary>, per_page: u64) -> Self {
        Self {
            store,
            media,
            per_page,
        }
    }
}

#[async_trait]
impl ArtistService for SeaOrmArtistService {
    async fn list(&self, page: PageNumber) -> Result<Page<Artist>, ArtistError> {
        Ok(self.store.list_artists_page(page, self.per_page).await?)
    }

    async fn get(&self, id: ArtistId) -> Result<Artist, ArtistError> {
        self.store
            .get_artist(id)
            .await?
            .ok_or(ArtistError::NotFound(id))
    }

    async fn create(&self, input: &FormInput) -> Result<ArtistId, ArtistError> {
        let fields = validation::artist::validate(input, &self.store).await?;
        let id = self.store.create_artist(fields).await?;

        record_mutation("artist", "create");
        Ok(id)
    }

    async fn update(&self, id: ArtistId, input: &FormInput) -> Result<(), ArtistError> {
        if self.store.get_artist(id).await?.is_none() {
            return Err(ArtistError::NotFound(id));
        }

        let fields = validation::artist::validate(input, &self.store).await?;

        if !self.store.update_artist(id, fields).await? {
            return Err(ArtistError::NotFound(id));
        }

        info!(artist_id = %id, "Updated artist");
        record_mutation("artist", "update");
        Ok(())
    }

    async fn destroy(&self, id: ArtistId) -> Result<(), ArtistError> {
        let txn = self.store.begin().await?;

        let Some(removed) = Store::delete_artist_cascade(&txn, id).await? else {
            return Err(ArtistError::NotFound(id));
        };

        txn.commit().await?;

        self.media.purge(&removed).await;
        record_mutation("artist", "delete");
        Ok(())
    }
}
