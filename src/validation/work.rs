use crate::config::MediaConfig;
use crate::constants::limits::{MAX_STRING_LENGTH, MAX_YEAR, MIN_YEAR};
use crate::domain::{ArtistId, MediaId};
use crate::models::work::WorkFields;

use super::{
    FormInput, Mode, Reference, ReferenceLookup, Rule, RuleSet, UploadedFile, ValidationError,
    parse_integer,
};

/// Rules for the work form. Update additionally accepts
/// `deleted_media_ids`, each of which must belong to the work being edited.
#[must_use]
pub fn rules(mode: Mode, media: &MediaConfig) -> RuleSet {
    let max = i64::try_from(MAX_STRING_LENGTH).unwrap_or(i64::MAX);
    let max_kb = i64::try_from(media.max_image_kb).unwrap_or(i64::MAX);

    let rules = RuleSet::new()
        .field("title", vec![Rule::Required, Rule::String, Rule::Max(max)])
        .field("description", vec![Rule::String])
        .field(
            "year_created",
            vec![Rule::Integer, Rule::Min(MIN_YEAR), Rule::Max(MAX_YEAR)],
        )
        .field(
            "artist_id",
            vec![Rule::Required, Rule::Integer, Rule::Exists(Reference::Artist)],
        )
        .field(
            "images",
            vec![Rule::Each(vec![
                Rule::File,
                Rule::Mimes(media.allowed_image_types.clone()),
                Rule::Max(max_kb),
            ])],
        );

    match mode {
        Mode::Create => rules,
        Mode::Update { work_id } => rules.field(
            "deleted_media_ids",
            vec![Rule::Each(vec![
                Rule::Integer,
                Rule::Exists(Reference::MediaOf(work_id)),
            ])],
        ),
    }
}

/// A validated work form.
#[derive(Debug, Clone)]
pub struct WorkInput {
    pub fields: WorkFields,
    pub images: Vec<UploadedFile>,
    pub deleted_media_ids: Vec<MediaId>,
}

/// Validates the work form and returns the typed fields plus attachments.
pub async fn validate(
    input: &FormInput,
    mode: Mode,
    media: &MediaConfig,
    lookup: &dyn ReferenceLookup,
) -> Result<WorkInput, ValidationError> {
    rules(mode, media).validate(input, lookup).await?;

    let year_created = input
        .text("year_created")
        .and_then(parse_integer)
        .and_then(|year| i32::try_from(year).ok());
    let artist_id = input
        .text("artist_id")
        .and_then(parse_integer)
        .and_then(|id| i32::try_from(id).ok())
        .map(ArtistId::new)
        .unwrap_or_default();

    let deleted_media_ids = match mode {
        Mode::Create => Vec::new(),
        Mode::Update { .. } => input
            .list("deleted_media_ids")
            .into_iter()
            .filter_map(parse_integer)
            .filter_map(|id| i32::try_from(id).ok())
            .map(MediaId::new)
            .collect(),
    };

    Ok(WorkInput {
        fields: WorkFields {
            title: input.text("title").unwrap_or_default().to_string(),
            description: input.text("description").map(str::to_string),
            year_created,
            artist_id,
        },
        images: input.files("images").to_vec(),
        deleted_media_ids,
    })
}
