use crate::domain::{MediaId, WorkId};
use crate::entities::media;

/// A stored attachment belonging to a work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub id: MediaId,
    pub work_id: WorkId,
    pub collection_name: String,
    pub name: String,
    pub file_name: String,
    pub mime_type: String,
    pub disk_path: String,
    pub size: i64,
    pub order_column: i32,
    pub created_at: String,
}

impl MediaItem {
    /// Public URL of the stored file under `public_path`.
    #[must_use]
    pub fn url(&self, public_path: &str) -> String {
        format!("{}/{}", public_path.trim_end_matches('/'), self.disk_path)
    }
}

impl From<media::Model> for MediaItem {
    fn from(model: media::Model) -> Self {
        Self {
            id: MediaId::new(model.id),
            work_id: WorkId::new(model.work_id),
            collection_name: model.collection_name,
            name: model.name,
            file_name: model.file_name,
            mime_type: model.mime_type,
            disk_path: model.disk_path,
            size: model.size,
            order_column: model.order_column,
            created_at: model.created_at,
        }
    }
}

/// Metadata for an attachment that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedia {
    pub work_id: WorkId,
    pub collection_name: String,
    pub name: String,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> MediaItem {
        MediaItem {
            id: MediaId::new(12),
            work_id: WorkId::new(3),
            collection_name: "images".to_string(),
            name: "sunrise".to_string(),
            file_name: "sunrise.png".to_string(),
            mime_type: "image/png".to_string(),
            disk_path: "12/sunrise.png".to_string(),
            size: 2048,
            order_column: 1,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn url_joins_public_path() {
        assert_eq!(item().url("/storage"), "/storage/12/sunrise.png");
        assert_eq!(item().url("/storage/"), "/storage/12/sunrise.png");
    }
}
