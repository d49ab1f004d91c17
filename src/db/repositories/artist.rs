use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

use crate::domain::{ArtistId, Page, PageNumber};
use crate::entities::{artists, media, prelude::*, works};
use crate::models::artist::{Artist, ArtistFields};
use crate::models::media::MediaItem;

pub struct ArtistRepository {
    conn: DatabaseConnection,
}

impl ArtistRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_page(&self, page: PageNumber, per_page: u64) -> Result<Page<Artist>> {
        let paginator = Artists::find()
            .order_by_asc(artists::Column::Id)
            .paginate(&self.conn, per_page);

        let total = paginator
            .num_items()
            .await
            .context("Failed to count artists")?;
        let rows = paginator
            .fetch_page(page.index())
            .await
            .context("Failed to fetch artist page")?;

        Ok(Page::new(
            rows.into_iter().map(Artist::from).collect(),
            total,
            page,
            per_page,
        ))
    }

    /// Every artist, for select lists.
    pub async fn list_all(&self) -> Result<Vec<Artist>> {
        let rows = Artists::find()
            .order_by_asc(artists::Column::Name)
            .order_by_asc(artists::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list artists")?;

        Ok(rows.into_iter().map(Artist::from).collect())
    }

    pub async fn get(&self, id: ArtistId) -> Result<Option<Artist>> {
        let row = Artists::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query artist")?;

        Ok(row.map(Artist::from))
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        let Ok(id) = i32::try_from(id) else {
            return Ok(false);
        };

        let count = Artists::find()
            .filter(artists::Column::Id.eq(id))
            .count(&self.conn)
            .await
            .context("Failed to check artist existence")?;

        Ok(count > 0)
    }

    pub async fn create(&self, fields: ArtistFields) -> Result<ArtistId> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = Artists::insert(artists::ActiveModel {
            name: Set(fields.name),
            bio: Set(fields.bio),
            birth_date: Set(fields.birth_date),
            death_date: Set(fields.death_date),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        })
        .exec(&self.conn)
        .await
        .context("Failed to insert artist")?;

        let id = ArtistId::new(result.last_insert_id);
        info!(artist_id = %id, "Created artist");
        Ok(id)
    }

    /// Replaces the editable fields. Returns false when the row is gone.
    pub async fn update(&self, id: ArtistId, fields: ArtistFields) -> Result<bool> {
        let Some(model) = Artists::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query artist for update")?
        else {
            return Ok(false);
        };

        let mut active: artists::ActiveModel = model.into();
        active.name = Set(fields.name);
        active.bio = Set(fields.bio);
        active.birth_date = Set(fields.birth_date);
        active.death_date = Set(fields.death_date);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to update artist")?;

        Ok(true)
    }

    /// Deletes the artist, its works and their media rows inside `txn`.
    /// Returns the media rows removed so their files can be cleaned up after
    /// commit, or `None` when the artist does not exist.
    pub async fn delete_cascade(
        txn: &DatabaseTransaction,
        id: ArtistId,
    ) -> Result<Option<Vec<MediaItem>>> {
        if Artists::find_by_id(id.value()).one(txn).await?.is_none() {
            return Ok(None);
        }

        let work_ids: Vec<i32> = Works::find()
            .select_only()
            .column(works::Column::Id)
            .filter(works::Column::ArtistId.eq(id.value()))
            .into_tuple()
            .all(txn)
            .await
            .context("Failed to collect artist works")?;

        let removed = Media::find()
            .filter(media::Column::WorkId.is_in(work_ids.clone()))
            .all(txn)
            .await
            .context("Failed to collect artist media")?;

        Media::delete_many()
            .filter(media::Column::WorkId.is_in(work_ids.clone()))
            .exec(txn)
            .await
            .context("Failed to delete artist media")?;

        Works::delete_many()
            .filter(works::Column::ArtistId.eq(id.value()))
            .exec(txn)
            .await
            .context("Failed to delete artist works")?;

        Artists::delete_by_id(id.value())
            .exec(txn)
            .await
            .context("Failed to delete artist")?;

        info!(
            artist_id = %id,
            works = work_ids.len(),
            media = removed.len(),
            "Deleted artist with cascade"
        );

        Ok(Some(removed.into_iter().map(MediaItem::from).collect()))
    }
}
