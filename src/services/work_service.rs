//! Domain service for works and their image attachments.

use thiserror::Error;

use crate::domain::{Page, PageNumber, WorkId};
use crate::models::artist::Artist;
use crate::models::work::Work;
use crate::services::media::MediaError;
use crate::validation::{FieldErrors, FormInput, ValidationError};

/// Errors specific to work operations.
#[derive(Debug, Error)]
pub enum WorkError {
    #[error("Work not found: {0}")]
    NotFound(WorkId),

    #[error("The given data was invalid.")]
    Validation(FieldErrors),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for WorkError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for WorkError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<ValidationError> for WorkError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Fields(errors) => Self::Validation(errors),
            ValidationError::Lookup(e) => Self::from(e),
        }
    }
}

impl From<MediaError> for WorkError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Storage(e) => Self::Storage(e.to_string()),
            MediaError::Database(e) => Self::from(e),
        }
    }
}

/// Data behind the create and edit forms.
#[derive(Debug, Clone)]
pub struct WorkForm {
    /// The work being edited; `None` on the create form.
    pub work: Option<Work>,
    pub artists: Vec<Artist>,
}

#[async_trait::async_trait]
pub trait WorkService: Send + Sync {
    /// One page of works in insertion order, with artist and images loaded.
    async fn list(&self, page: PageNumber) -> Result<Page<Work>, WorkError>;

    /// A single work with artist and images.
    ///
    /// # Errors
    ///
    /// Returns [`WorkError::NotFound`] if the work does not exist.
    async fn show(&self, id: WorkId) -> Result<Work, WorkError>;

    async fn new_form(&self) -> Result<WorkForm, WorkError>;

    async fn edit_form(&self, id: WorkId) -> Result<WorkForm, WorkError>;

    /// Validates the input, inserts the work and stores its images in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// - [`WorkError::Validation`] with per-field messages; nothing is written
    /// - [`WorkError::Storage`] when an image cannot be written; the insert is
    ///   rolled back and files already written are removed
    async fn create(&self, input: &FormInput) -> Result<WorkId, WorkError>;

    /// Replaces the editable fields, deletes the listed media and appends new
    /// images. A missing work is reported before the input is validated.
    async fn update(&self, id: WorkId, input: &FormInput) -> Result<(), WorkError>;

    /// Deletes the work, its media rows and their files.
    async fn destroy(&self, id: WorkId) -> Result<(), WorkError>;
}
