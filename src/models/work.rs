use crate::domain::{ArtistId, WorkId};
use crate::entities::works;
use crate::models::artist::Artist;
use crate::models::media::MediaItem;

/// A work record. `artist` and `images` are only populated when the
/// query loaded those relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Work {
    pub id: WorkId,
    pub title: String,
    pub description: Option<String>,
    pub year_created: Option<i32>,
    pub artist_id: ArtistId,
    pub created_at: String,
    pub updated_at: String,
    pub artist: Option<Artist>,
    pub images: Option<Vec<MediaItem>>,
}

impl From<works::Model> for Work {
    fn from(model: works::Model) -> Self {
        Self {
            id: WorkId::new(model.id),
            title: model.title,
            description: model.description,
            year_created: model.year_created,
            artist_id: ArtistId::new(model.artist_id),
            created_at: model.created_at,
            updated_at: model.updated_at,
            artist: None,
            images: None,
        }
    }
}

impl Work {
    #[must_use]
    pub fn with_artist(mut self, artist: Option<Artist>) -> Self {
        self.artist = artist;
        self
    }

    #[must_use]
    pub fn with_images(mut self, images: Vec<MediaItem>) -> Self {
        self.images = Some(images);
        self
    }
}

/// Editable work fields after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkFields {
    pub title: String,
    pub description: Option<String>,
    pub year_created: Option<i32>,
    pub artist_id: ArtistId,
}
