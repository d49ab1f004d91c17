use chrono::NaiveDate;

use crate::domain::ArtistId;
use crate::entities::artists;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<artists::Model> for Artist {
    fn from(model: artists::Model) -> Self {
        Self {
            id: ArtistId::new(model.id),
            name: model.name,
            bio: model.bio,
            birth_date: model.birth_date,
            death_date: model.death_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Editable artist fields after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistFields {
    pub name: String,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
}
