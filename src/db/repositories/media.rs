use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::domain::{MediaId, WorkId};
use crate::entities::{media, prelude::*};
use crate::models::media::{MediaItem, NewMedia};

pub struct MediaRepository {
    conn: DatabaseConnection,
}

impl MediaRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Media ids among `ids` that are attached to `work_id`.
    pub async fn owned_by_work(&self, work_id: WorkId, ids: &[i64]) -> Result<Vec<i64>> {
        let ids: Vec<i32> = ids.iter().filter_map(|id| i32::try_from(*id).ok()).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let owned: Vec<i32> = Media::find()
            .select_only()
            .column(media::Column::Id)
            .filter(media::Column::WorkId.eq(work_id.value()))
            .filter(media::Column::Id.is_in(ids))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to check media ownership")?;

        Ok(owned.into_iter().map(i64::from).collect())
    }

    pub async fn list_for_work(&self, work_id: WorkId) -> Result<Vec<MediaItem>> {
        let rows = Media::find()
            .filter(media::Column::WorkId.eq(work_id.value()))
            .order_by_asc(media::Column::OrderColumn)
            .all(&self.conn)
            .await
            .context("Failed to list work media")?;

        Ok(rows.into_iter().map(MediaItem::from).collect())
    }

    /// Inserts the metadata row and fills in the storage path, which depends
    /// on the assigned id.
    pub async fn insert(txn: &DatabaseTransaction, new: NewMedia) -> Result<MediaItem> {
        let order: Option<Option<i32>> = Media::find()
            .select_only()
            .column_as(media::Column::OrderColumn.max(), "max_order")
            .filter(media::Column::WorkId.eq(new.work_id.value()))
            .filter(media::Column::CollectionName.eq(new.collection_name.clone()))
            .into_tuple()
            .one(txn)
            .await
            .context("Failed to read media order")?;
        let next_order = order.flatten().unwrap_or(0) + 1;

        let inserted = media::ActiveModel {
            work_id: Set(new.work_id.value()),
            collection_name: Set(new.collection_name),
            name: Set(new.name),
            file_name: Set(new.file_name.clone()),
            mime_type: Set(new.mime_type),
            disk_path: Set(String::new()),
            size: Set(new.size),
            order_column: Set(next_order),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(txn)
        .await
        .context("Failed to insert media")?;

        let disk_path = format!("{}/{}", inserted.id, new.file_name);
        let mut active: media::ActiveModel = inserted.into();
        active.disk_path = Set(disk_path);
        let model = active
            .update(txn)
            .await
            .context("Failed to set media path")?;

        Ok(MediaItem::from(model))
    }

    /// Deletes the given media rows of a work, returning what was removed.
    pub async fn delete_for_work(
        txn: &DatabaseTransaction,
        work_id: WorkId,
        ids: &[MediaId],
    ) -> Result<Vec<MediaItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = ids.iter().map(MediaId::value).collect();
        let removed = Media::find()
            .filter(media::Column::WorkId.eq(work_id.value()))
            .filter(media::Column::Id.is_in(ids.clone()))
            .all(txn)
            .await
            .context("Failed to collect media for deletion")?;

        Media::delete_many()
            .filter(media::Column::WorkId.eq(work_id.value()))
            .filter(media::Column::Id.is_in(ids))
            .exec(txn)
            .await
            .context("Failed to delete media")?;

        Ok(removed.into_iter().map(MediaItem::from).collect())
    }
}
