//! `SeaORM` implementation of the `WorkService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::MediaConfig;
use crate::db::Store;
use crate::domain::{Page, PageNumber, WorkId};
use crate::models::work::Work;
use crate::services::media::MediaLibrary;
use crate::services::record_mutation;
use crate::services::work_service::{WorkError, WorkForm, WorkService};
use crate::validation::{self, FormInput, Mode};

pub struct SeaOrmWorkService {
    store: Store,
    media: Arc<MediaLibrary>,
    media_config: MediaConfig,
    per_page: u64,
}

impl SeaOrmWorkService {
    #[must_use]
    pub const fn new(
        store: Store,
        media: Arc<MediaLibrary>,
        media_config: MediaConfig,
        per_page: u64,
    ) -> Self {
        Self {
            store,
            media,
            media_config,
            per_page,
        }
    }
}

#[async_trait]
impl WorkService for SeaOrmWorkService {
    async fn list(&self, page: PageNumber) -> Result<Page<Work>, WorkError> {
        Ok(self.store.list_works_page(page, self.per_page).await?)
    }

    async fn show(&self, id: WorkId) -> Result<Work, WorkError> {
        self.store
            .get_work(id)
            .await?
            .ok_or(WorkError::NotFound(id))
    }

    async fn new_form(&self) -> Result<WorkForm, WorkError> {
        Ok(WorkForm {
            work: None,
            artists: self.store.list_all_artists().await?,
        })
    }

    async fn edit_form(&self, id: WorkId) -> Result<WorkForm, WorkError> {
        let work = self.show(id).await?;

        Ok(WorkForm {
            work: Some(work),
            artists: self.store.list_all_artists().await?,
        })
    }

    async fn create(&self, input: &FormInput) -> Result<WorkId, WorkError> {
        let input =
            validation::work::validate(input, Mode::Create, &self.media_config, &self.store)
                .await?;

        let txn = self.store.begin().await?;
        let id = Store::insert_work(&txn, input.fields).await?;
        let attached = self.media.attach_all(&txn, id, &input.images).await?;

        if let Err(e) = txn.commit().await {
            self.media.purge(&attached).await;
            return Err(e.into());
        }

        info!(work_id = %id, images = attached.len(), "Created work");
        record_mutation("work", "create");
        Ok(id)
    }

    async fn update(&self, id: WorkId, input: &FormInput) -> Result<(), WorkError> {
        if !self.store.work_exists(id).await? {
            return Err(WorkError::NotFound(id));
        }

        let mode = Mode::Update { work_id: id };
        let input =
            validation::work::validate(input, mode, &self.media_config, &self.store).await?;

        let txn = self.store.begin().await?;

        if !Store::update_work(&txn, id, input.fields).await? {
            return Err(WorkError::NotFound(id));
        }

        let removed = Store::delete_work_media(&txn, id, &input.deleted_media_ids).await?;
        let attached = self.media.attach_all(&txn, id, &input.images).await?;

        if let Err(e) = txn.commit().await {
            self.media.purge(&attached).await;
            return Err(e.into());
        }

        self.media.purge(&removed).await;

        info!(
            work_id = %id,
            added = attached.len(),
            removed = removed.len(),
            "Updated work"
        );
        record_mutation("work", "update");
        Ok(())
    }

    async fn destroy(&self, id: WorkId) -> Result<(), WorkError> {
        let txn = self.store.begin().await?;

        let Some(removed) = Store::delete_work_cascade(&txn, id).await? else {
            return Err(WorkError::NotFound(id));
        };

        txn.commit().await?;

        self.media.purge(&removed).await;

        info!(work_id = %id, images = removed.len(), "Deleted work");
        record_mutation("work", "delete");
        Ok(())
    }
}
