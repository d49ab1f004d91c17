use anyhow::{Context, Result};
use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, TransactionTrait,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{ArtistId, MediaId, Page, PageNumber, WorkId};
use crate::models::artist::{Artist, ArtistFields};
use crate::models::media::{MediaItem, NewMedia};
use crate::models::work::{Work, WorkFields};

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn begin(&self) -> Result<DatabaseTransaction> {
        self.conn
            .begin()
            .await
            .context("Failed to start transaction")
    }

    fn artist_repo(&self) -> repositories::artist::ArtistRepository {
        repositories::artist::ArtistRepository::new(self.conn.clone())
    }

    fn work_repo(&self) -> repositories::work::WorkRepository {
        repositories::work::WorkRepository::new(self.conn.clone())
    }

    fn media_repo(&self) -> repositories::media::MediaRepository {
        repositories::media::MediaRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    // Artists

    pub async fn list_artists_page(&self, page: PageNumber, per_page: u64) -> Result<Page<Artist>> {
        self.artist_repo().list_page(page, per_page).await
    }

    pub async fn list_all_artists(&self) -> Result<Vec<Artist>> {
        self.artist_repo().list_all().await
    }

    pub async fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>> {
        self.artist_repo().get(id).await
    }

    pub async fn artist_exists(&self, id: i64) -> Result<bool> {
        self.artist_repo().exists(id).await
    }

    pub async fn create_artist(&self, fields: ArtistFields) -> Result<ArtistId> {
        self.artist_repo().create(fields).await
    }

    pub async fn update_artist(&self, id: ArtistId, fields: ArtistFields) -> Result<bool> {
        self.artist_repo().update(id, fields).await
    }

    pub async fn delete_artist_cascade(
        txn: &DatabaseTransaction,
        id: ArtistId,
    ) -> Result<Option<Vec<MediaItem>>> {
        repositories::artist::ArtistRepository::delete_cascade(txn, id).await
    }

    // Works

    pub async fn list_works_page(&self, page: PageNumber, per_page: u64) -> Result<Page<Work>> {
        self.work_repo().list_page(page, per_page).await
    }

    pub async fn get_work(&self, id: WorkId) -> Result<Option<Work>> {
        self.work_repo().get_with_relations(id).await
    }

    pub async fn work_exists(&self, id: WorkId) -> Result<bool> {
        self.work_repo().exists(id).await
    }

    pub async fn insert_work(txn: &DatabaseTransaction, fields: WorkFields) -> Result<WorkId> {
        repositories::work::WorkRepository::insert(txn, fields).await
    }

    pub async fn update_work(
        txn: &DatabaseTransaction,
        id: WorkId,
        fields: WorkFields,
    ) -> Result<bool> {
        repositories::work::WorkRepository::update(txn, id, fields).await
    }

    pub async fn delete_work_cascade(
        txn: &DatabaseTransaction,
        id: WorkId,
    ) -> Result<Option<Vec<MediaItem>>> {
        repositories::work::WorkRepository::delete_cascade(txn, id).await
    }

    // Media

    pub async fn media_owned_by_work(&self, work_id: WorkId, ids: &[i64]) -> Result<Vec<i64>> {
        self.media_repo().owned_by_work(work_id, ids).await
    }

    pub async fn list_work_media(&self, work_id: WorkId) -> Result<Vec<MediaItem>> {
        self.media_repo().list_for_work(work_id).await
    }

    pub async fn insert_media(txn: &DatabaseTransaction, new: NewMedia) -> Result<MediaItem> {
        repositories::media::MediaRepository::insert(txn, new).await
    }

    pub async fn delete_work_media(
        txn: &DatabaseTransaction,
        work_id: WorkId,
        ids: &[MediaId],
    ) -> Result<Vec<MediaItem>> {
        repositories::media::MediaRepository::delete_for_work(txn, work_id, ids).await
    }

    // Users

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn upsert_user(&self, username: &str, password: &str) -> Result<User> {
        self.user_repo().upsert(username, password).await
    }
}
