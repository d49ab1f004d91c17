//! Attaches uploaded images to works and cleans up their files.

use std::path::Path;
use std::sync::Arc;

use sea_orm::DatabaseTransaction;
use thiserror::Error;
use tracing::{info, warn};

use crate::constants::media::IMAGES_COLLECTION;
use crate::db::Store;
use crate::domain::WorkId;
use crate::models::media::{MediaItem, NewMedia};
use crate::services::storage::{FileStorage, StorageError};
use crate::validation::{UploadedFile, detect_image};
use image::ImageFormat;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Media database error: {0}")]
    Database(#[from] anyhow::Error),
}

pub struct MediaLibrary {
    storage: Arc<dyn FileStorage>,
}

impl MediaLibrary {
    #[must_use]
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self { storage }
    }

    /// Inserts a media row for every upload and writes its file.
    ///
    /// On failure the files already written by this call are removed before
    /// the error is returned; rolling back `txn` is left to the caller.
    pub async fn attach_all(
        &self,
        txn: &DatabaseTransaction,
        work_id: WorkId,
        uploads: &[UploadedFile],
    ) -> Result<Vec<MediaItem>, MediaError> {
        let mut attached: Vec<MediaItem> = Vec::with_capacity(uploads.len());

        for upload in uploads {
            match self.attach(txn, work_id, upload).await {
                Ok(item) => attached.push(item),
                Err(e) => {
                    self.purge(&attached).await;
                    return Err(e);
                }
            }
        }

        if !attached.is_empty() {
            info!(work_id = %work_id, count = attached.len(), "Attached images");
        }
        Ok(attached)
    }

    async fn attach(
        &self,
        txn: &DatabaseTransaction,
        work_id: WorkId,
        upload: &UploadedFile,
    ) -> Result<MediaItem, MediaError> {
        let format = detect_image(&upload.bytes);
        let mime_type = format.map_or_else(
            || "application/octet-stream".to_string(),
            |format| format.to_mime_type().to_string(),
        );

        let item = Store::insert_media(
            txn,
            NewMedia {
                work_id,
                collection_name: IMAGES_COLLECTION.to_string(),
                name: display_name(&upload.file_name),
                file_name: stored_file_name(&upload.file_name, format),
                mime_type,
                size: i64::try_from(upload.bytes.len()).unwrap_or(i64::MAX),
            },
        )
        .await?;

        self.storage.put(&item.disk_path, &upload.bytes).await?;
        Ok(item)
    }

    /// Removes stored files. Failures are logged and skipped.
    pub async fn purge(&self, items: &[MediaItem]) {
        for item in items {
            if let Err(e) = self.storage.delete(&item.disk_path).await {
                warn!(
                    media_id = %item.id,
                    path = %item.disk_path,
                    error = %e,
                    "Failed to delete media file"
                );
            }
        }
    }
}

/// Uploaded file name without directories or extension.
#[must_use]
pub fn display_name(original: &str) -> String {
    let base = base_name(original);
    Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("file")
        .to_string()
}

/// Stored file name: the sanitized upload stem plus the extension of the
/// detected format. The uploaded extension is dropped.
#[must_use]
pub fn stored_file_name(original: &str, format: Option<ImageFormat>) -> String {
    let extension = format
        .and_then(|f| f.extensions_str().first().copied())
        .unwrap_or("bin");
    format!("{}.{extension}", sanitize_stem(&display_name(original)))
}

/// Replaces anything outside `[A-Za-z0-9._-]` with `-` and strips leading dots.
fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

fn base_name(original: &str) -> &str {
    original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .trim()
}
