use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{Page, PageNumber, WorkId};
use crate::entities::{artists, media, prelude::*, works};
use crate::models::artist::Artist;
use crate::models::media::MediaItem;
use crate::models::work::{Work, WorkFields};

pub struct WorkRepository {
    conn: DatabaseConnection,
}

impl WorkRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_row(model: works::Model, artist: Option<artists::Model>) -> Work {
        Work::from(model).with_artist(artist.map(Artist::from))
    }

    /// One page of works, oldest first, with artist and images loaded.
    pub async fn list_page(&self, page: PageNumber, per_page: u64) -> Result<Page<Work>> {
        let paginator = Works::find()
            .order_by_asc(works::Column::Id)
            .find_also_related(Artists)
            .paginate(&self.conn, per_page);

        let total = paginator
            .num_items()
            .await
            .context("Failed to count works")?;
        let rows = paginator
            .fetch_page(page.index())
            .await
            .context("Failed to fetch work page")?;

        let ids: Vec<i32> = rows.iter().map(|(work, _)| work.id).collect();
        let mut images = self.images_by_work(&ids).await?;

        let items = rows
            .into_iter()
            .map(|(work, artist)| {
                let attached = images.remove(&work.id).unwrap_or_default();
                Self::map_row(work, artist).with_images(attached)
            })
            .collect();

        Ok(Page::new(items, total, page, per_page))
    }

    /// A single work with artist and images loaded.
    pub async fn get_with_relations(&self, id: WorkId) -> Result<Option<Work>> {
        let row = Works::find_by_id(id.value())
            .find_also_related(Artists)
            .one(&self.conn)
            .await
            .context("Failed to query work")?;

        let Some((work, artist)) = row else {
            return Ok(None);
        };

        let images = self
            .images_by_work(&[work.id])
            .await?
            .remove(&work.id)
            .unwrap_or_default();

        Ok(Some(Self::map_row(work, artist).with_images(images)))
    }

    pub async fn exists(&self, id: WorkId) -> Result<bool> {
        let count = Works::find()
            .filter(works::Column::Id.eq(id.value()))
            .count(&self.conn)
            .await
            .context("Failed to check work existence")?;

        Ok(count > 0)
    }

    async fn images_by_work(&self, work_ids: &[i32]) -> Result<HashMap<i32, Vec<MediaItem>>> {
        if work_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Media::find()
            .filter(media::Column::WorkId.is_in(work_ids.to_vec()))
            .filter(media::Column::CollectionName.eq(crate::constants::media::IMAGES_COLLECTION))
            .order_by_asc(media::Column::OrderColumn)
            .order_by_asc(media::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to load work images")?;

        let mut grouped: HashMap<i32, Vec<MediaItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.work_id).or_default().push(MediaItem::from(row));
        }
        Ok(grouped)
    }

    pub async fn insert(txn: &DatabaseTransaction, fields: WorkFields) -> Result<WorkId> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = Works::insert(works::ActiveModel {
            title: Set(fields.title),
            description: Set(fields.description),
            year_created: Set(fields.year_created),
            artist_id: Set(fields.artist_id.value()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        })
        .exec(txn)
        .await
        .context("Failed to insert work")?;

        Ok(WorkId::new(result.last_insert_id))
    }

    /// Replaces the editable fields. Returns false when the row is gone.
    pub async fn update(txn: &DatabaseTransaction, id: WorkId, fields: WorkFields) -> Result<bool> {
        let Some(model) = Works::find_by_id(id.value())
            .one(txn)
            .await
            .context("Failed to query work for update")?
        else {
            return Ok(false);
        };

        let mut active: works::ActiveModel = model.into();
        active.title = Set(fields.title);
        active.description = Set(fields.description);
        active.year_created = Set(fields.year_created);
        active.artist_id = Set(fields.artist_id.value());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(txn)
            .await
            .context("Failed to update work")?;

        Ok(true)
    }

    /// Deletes the work and its media rows inside `txn`, returning the media
    /// removed, or `None` when the work does not exist.
    pub async fn delete_cascade(
        txn: &DatabaseTransaction,
        id: WorkId,
    ) -> Result<Option<Vec<MediaItem>>> {
        if Works::find_by_id(id.value()).one(txn).await?.is_none() {
            return Ok(None);
        }

        let removed = Media::find()
            .filter(media::Column::WorkId.eq(id.value()))
            .all(txn)
            .await
            .context("Failed to collect work media")?;

        Media::delete_many()
            .filter(media::Column::WorkId.eq(id.value()))
            .exec(txn)
            .await
            .context("Failed to delete work media")?;

        Works::delete_by_id(id.value())
            .exec(txn)
            .await
            .context("Failed to delete work")?;

        Ok(Some(removed.into_iter().map(MediaItem::from).collect()))
    }
}
