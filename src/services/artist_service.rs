//! Domain service for artist records.

use thiserror::Error;

use crate::domain::{ArtistId, Page, PageNumber};
use crate::models::artist::Artist;
use crate::validation::{FieldErrors, FormInput, ValidationError};

/// Errors specific to artist operations.
#[derive(Debug, Error)]
pub enum ArtistError {
    #[error("Artist not found: {0}")]
    NotFound(ArtistId),

    #[error("The given data was invalid.")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for ArtistError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ArtistError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<ValidationError> for ArtistError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Fields(errors) => Self::Validation(errors),
            ValidationError::Lookup(e) => Self::from(e),
        }
    }
}

#[async_trait::async_trait]
pub trait ArtistService: Send + Sync {
    /// One page of artists in insertion order.
    async fn list(&self, page: PageNumber) -> Result<Page<Artist>, ArtistError>;

    /// # Errors
    ///
    /// Returns [`ArtistError::NotFound`] if the artist does not exist.
    async fn get(&self, id: ArtistId) -> Result<Artist, ArtistError>;

    /// Validates and inserts a new artist.
    ///
    /// # Errors
    ///
    /// Returns [`ArtistError::Validation`] with per-field messages; nothing
    /// is written in that case.
    async fn create(&self, input: &FormInput) -> Result<ArtistId, ArtistError>;

    /// Validates and replaces the editable fields of an existing artist.
    /// A missing artist is reported before the input is validated.
    async fn update(&self, id: ArtistId, input: &FormInput) -> Result<(), ArtistError>;

    /// Deletes the artist together with its works and their images.
    async fn destroy(&self, id: ArtistId) -> Result<(), ArtistError>;
}
