//! Declarative request validation.
//!
//! A [`RuleSet`] lists the rules for each field as tagged [`Rule`] values and
//! one evaluator checks them against a [`FormInput`]. Failures are collected
//! per field into [`FieldErrors`] with human-readable messages; the first
//! failing rule of a field stops evaluation of that field. Fields that are
//! absent and not [`Rule::Required`] are skipped.

pub mod artist;
pub mod input;
pub mod work;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use image::ImageFormat;
use serde::Serialize;

use crate::db::Store;
use crate::domain::WorkId;

pub use input::{FormInput, InputValue, UploadedFile};

/// Which form a rule set validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update { work_id: WorkId },
}

/// Target of an existence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Artist,
    /// A media row attached to the given work.
    MediaOf(WorkId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Required,
    String,
    Integer,
    Date,
    /// Lower bound: value for integers, length for strings, kilobytes for files.
    Min(i64),
    /// Upper bound, measured like [`Rule::Min`].
    Max(i64),
    /// Strictly after the date in the named field, checked only when both
    /// parse.
    After(&'static str),
    Exists(Reference),
    File,
    /// Allowed file types by extension, matched against the detected content.
    Mimes(Vec<String>),
    /// Rules applied to every element of a list, with errors keyed
    /// `field.{index}`. Nested `Each` is not evaluated.
    Each(Vec<Rule>),
}

#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    async fn exists(&self, reference: Reference, id: i64) -> anyhow::Result<bool>;
}

#[async_trait]
impl ReferenceLookup for Store {
    async fn exists(&self, reference: Reference, id: i64) -> anyhow::Result<bool> {
        match reference {
            Reference::Artist => self.artist_exists(id).await,
            Reference::MediaOf(work_id) => Ok(!self
                .media_owned_by_work(work_id, &[id])
                .await?
                .is_empty()),
        }
    }
}

/// Field name to messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("The given data was invalid.")]
    Fields(FieldErrors),

    #[error("Validation lookup failed: {0}")]
    Lookup(#[from] anyhow::Error),
}

impl ValidationError {
    #[must_use]
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Fields(errors) => Some(errors),
            Self::Lookup(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
struct FieldRules {
    name: &'static str,
    rules: Vec<Rule>,
}

#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: Vec<FieldRules>,
}

#[derive(Debug, Clone, Copy)]
enum Subject<'a> {
    Text(&'a str),
    List(&'a [String]),
    Files(&'a [UploadedFile]),
    File(&'a UploadedFile),
}

impl<'a> Subject<'a> {
    fn of(input: &'a FormInput, field: &str) -> Option<Self> {
        let files = input.files(field);
        if !files.is_empty() {
            return Some(Self::Files(files));
        }

        match input.value(field)? {
            InputValue::Text(text) => Some(Self::Text(text)),
            InputValue::List(items) => Some(Self::List(items)),
        }
    }

    fn elements(self) -> Vec<Self> {
        match self {
            Self::Text(_) | Self::File(_) => vec![self],
            Self::List(items) => items.iter().map(|item| Self::Text(item)).collect(),
            Self::Files(files) => files.iter().map(Self::File).collect(),
        }
    }
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, name: &'static str, rules: Vec<Rule>) -> Self {
        self.fields.push(FieldRules { name, rules });
        self
    }

    /// Runs every field's rules. Never mutates anything; existence checks
    /// only read through `lookup`.
    pub async fn validate(
        &self,
        input: &FormInput,
        lookup: &dyn ReferenceLookup,
    ) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();

        for field in &self.fields {
            let subject = Subject::of(input, field.name);

            if let Some(message) =
                check(field.name, subject, &field.rules, input, lookup).await?
            {
                errors.add(field.name, message);
                continue;
            }

            let Some(subject) = subject else {
                continue;
            };

            for each in field.rules.iter().filter_map(|rule| match rule {
                Rule::Each(inner) => Some(inner),
                _ => None,
            }) {
                for (index, element) in subject.elements().into_iter().enumerate() {
                    let key = format!("{}.{index}", field.name);
                    if let Some(message) = check(&key, Some(element), each, input, lookup).await? {
                        errors.add(key, message);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Fields(errors))
        }
    }
}

/// Display name of a field: underscores become spaces.
fn attribute(field: &str) -> String {
    field.replace('_', " ")
}

/// Evaluates `rules` against one value and returns the first failure message.
async fn check(
    field: &str,
    subject: Option<Subject<'_>>,
    rules: &[Rule],
    input: &FormInput,
    lookup: &dyn ReferenceLookup,
) -> anyhow::Result<Option<String>> {
    let attr = attribute(field);

    let subject = match subject {
        None => {
            return Ok(rules
                .contains(&Rule::Required)
                .then(|| format!("The {attr} field is required.")));
        }
        Some(Subject::List(items)) if items.is_empty() => {
            return Ok(rules
                .contains(&Rule::Required)
                .then(|| format!("The {attr} field is required.")));
        }
        Some(subject) => subject,
    };

    let numeric = rules.contains(&Rule::Integer);

    for rule in rules {
        let failure = match rule {
            Rule::Required | Rule::Each(_) => None,
            Rule::String => (!matches!(subject, Subject::Text(_)))
                .then(|| format!("The {attr} field must be a string.")),
            Rule::Integer => match subject {
                Subject::Text(text) if parse_integer(text).is_some() => None,
                _ => Some(format!("The {attr} field must be an integer.")),
            },
            Rule::Date => match subject {
                Subject::Text(text) if parse_date(text).is_some() => None,
                _ => Some(format!("The {attr} field must be a valid date.")),
            },
            Rule::Min(min) => check_bound(&attr, subject, numeric, *min, Bound::Min),
            Rule::Max(max) => check_bound(&attr, subject, numeric, *max, Bound::Max),
            Rule::After(other) => {
                let this = match subject {
                    Subject::Text(text) => parse_date(text),
                    _ => None,
                };
                let that = input.text(other).and_then(parse_date);
                match (this, that) {
                    (Some(this), Some(that)) if this <= that => Some(format!(
                        "The {attr} field must be a date after {}.",
                        attribute(other)
                    )),
                    _ => None,
                }
            }
            Rule::Exists(reference) => {
                let found = match subject {
                    Subject::Text(text) => match parse_integer(text) {
                        Some(id) => lookup.exists(*reference, id).await?,
                        None => false,
                    },
                    _ => false,
                };
                (!found).then(|| format!("The selected {attr} is invalid."))
            }
            Rule::File => (!matches!(subject, Subject::File(_)))
                .then(|| format!("The {attr} field must be a file.")),
            Rule::Mimes(allowed) => {
                let accepted = match subject {
                    Subject::File(file) => detect_image(&file.bytes)
                        .is_some_and(|format| extension_allowed(format, allowed)),
                    _ => false,
                };
                (!accepted).then(|| {
                    format!(
                        "The {attr} field must be a file of type: {}.",
                        allowed.join(", ")
                    )
                })
            }
        };

        if failure.is_some() {
            return Ok(failure);
        }
    }

    Ok(None)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Min,
    Max,
}

fn check_bound(
    attr: &str,
    subject: Subject<'_>,
    numeric: bool,
    limit: i64,
    bound: Bound,
) -> Option<String> {
    let (measured, unit) = match subject {
        Subject::Text(text) if numeric => (parse_integer(text)?, ""),
        Subject::Text(text) => (
            i64::try_from(text.chars().count()).unwrap_or(i64::MAX),
            " characters",
        ),
        // Kilobytes, fractional sizes round up so 5120 KB + 1 byte exceeds 5120.
        Subject::File(file) => (
            i64::try_from(file.size().div_ceil(1024)).unwrap_or(i64::MAX),
            " kilobytes",
        ),
        Subject::List(items) => (i64::try_from(items.len()).unwrap_or(i64::MAX), " items"),
        Subject::Files(files) => (i64::try_from(files.len()).unwrap_or(i64::MAX), " items"),
    };

    let is_items = unit == " items";
    match bound {
        Bound::Max if measured > limit => Some(if is_items {
            format!("The {attr} field must not have more than {limit} items.")
        } else {
            format!("The {attr} field must not be greater than {limit}{unit}.")
        }),
        Bound::Min if measured < limit => Some(if is_items {
            format!("The {attr} field must have at least {limit} items.")
        } else {
            format!("The {attr} field must be at least {limit}{unit}.")
        }),
        _ => None,
    }
}

/// Parses an integer the way a form field carries it: optional sign, digits.
#[must_use]
pub fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and RFC 3339 timestamps.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Detects an image type from file content. Only the formats compiled into
/// the `image` crate build are recognised.
#[must_use]
pub fn detect_image(bytes: &[u8]) -> Option<ImageFormat> {
    match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP)) => Some(format),
        _ => None,
    }
}

fn extension_allowed(format: ImageFormat, allowed: &[String]) -> bool {
    format
        .extensions_str()
        .iter()
        .any(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Cursor;

    /// Lookup backed by fixed id sets.
    #[derive(Default)]
    pub struct StubLookup {
        pub artists: HashSet<i64>,
        pub media: HashSet<(i32, i64)>,
    }

    #[async_trait]
    impl ReferenceLookup for StubLookup {
        async fn exists(&self, reference: Reference, id: i64) -> anyhow::Result<bool> {
            Ok(match reference {
                Reference::Artist => self.artists.contains(&id),
                Reference::MediaOf(work_id) => self.media.contains(&(work_id.value(), id)),
            })
        }
    }

    pub fn encoded_image(format: ImageFormat) -> Vec<u8> {
        let image = image::DynamicImage::new_rgb8(4, 4);
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, format).unwrap();
        bytes.into_inner()
    }

    pub fn upload(name: &str, bytes: Vec<u8>) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: None,
            bytes,
        }
    }

    async fn run(rules: RuleSet, input: FormInput) -> FieldErrors {
        match rules.validate(&input, &StubLookup::default()).await {
            Ok(()) => FieldErrors::new(),
            Err(ValidationError::Fields(errors)) => errors,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[tokio::test]
    async fn required_and_optional_fields() {
        let rules = RuleSet::new()
            .field("name", vec![Rule::Required, Rule::String])
            .field("bio", vec![Rule::String]);

        let errors = run(rules.clone(), FormInput::new().with_text("name", "  ")).await;
        assert_eq!(errors.first("name"), Some("The name field is required."));
        assert!(!errors.contains("bio"));

        let errors = run(rules, FormInput::new().with_text("name", "Klimt")).await;
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn max_counts_characters_for_strings() {
        let rules = RuleSet::new().field("title", vec![Rule::String, Rule::Max(5)]);

        assert!(run(rules.clone(), FormInput::new().with_text("title", "ééééé")).await.is_empty());

        let errors = run(rules, FormInput::new().with_text("title", "toolong")).await;
        assert_eq!(
            errors.first("title"),
            Some("The title field must not be greater than 5 characters.")
        );
    }

    #[tokio::test]
    async fn integer_bounds_use_the_value() {
        let rules = RuleSet::new().field(
            "year_created",
            vec![Rule::Integer, Rule::Min(1), Rule::Max(9999)],
        );

        for ok in ["1", "9999", "1889"] {
            let errors = run(rules.clone(), FormInput::new().with_text("year_created", ok)).await;
            assert!(errors.is_empty(), "{ok} should pass");
        }

        let errors = run(rules.clone(), FormInput::new().with_text("year_created", "0")).await;
        assert_eq!(
            errors.first("year_created"),
            Some("The year created field must be at least 1.")
        );

        let errors = run(rules.clone(), FormInput::new().with_text("year_created", "10000")).await;
        assert_eq!(
            errors.first("year_created"),
            Some("The year created field must not be greater than 9999.")
        );

        let errors = run(rules, FormInput::new().with_text("year_created", "12.5")).await;
        assert_eq!(
            errors.first("year_created"),
            Some("The year created field must be an integer.")
        );
    }

    #[tokio::test]
    async fn after_is_strict_and_needs_both_dates() {
        let rules = RuleSet::new()
            .field("birth_date", vec![Rule::Date])
            .field("death_date", vec![Rule::Date, Rule::After("birth_date")]);

        let input = FormInput::new()
            .with_text("birth_date", "1840-11-14")
            .with_text("death_date", "1840-11-14");
        let errors = run(rules.clone(), input).await;
        assert_eq!(
            errors.first("death_date"),
            Some("The death date field must be a date after birth date.")
        );

        let input = FormInput::new()
            .with_text("birth_date", "1840-11-14")
            .with_text("death_date", "1926-12-05");
        assert!(run(rules.clone(), input).await.is_empty());

        let input = FormInput::new().with_text("death_date", "1926-12-05");
        assert!(run(rules.clone(), input).await.is_empty());

        let input = FormInput::new().with_text("birth_date", "not a date");
        let errors = run(rules, input).await;
        assert_eq!(
            errors.first("birth_date"),
            Some("The birth date field must be a valid date.")
        );
    }

    #[tokio::test]
    async fn exists_consults_the_lookup() {
        let lookup = StubLookup {
            artists: HashSet::from([4]),
            ..StubLookup::default()
        };
        let rules =
            RuleSet::new().field("artist_id", vec![Rule::Required, Rule::Integer, Rule::Exists(Reference::Artist)]);

        assert!(
            rules
                .validate(&FormInput::new().with_text("artist_id", "4"), &lookup)
                .await
                .is_ok()
        );

        let err = rules
            .validate(&FormInput::new().with_text("artist_id", "5"), &lookup)
            .await
            .unwrap_err();
        assert_eq!(
            err.field_errors().and_then(|e| e.first("artist_id")),
            Some("The selected artist id is invalid.")
        );
    }

    #[tokio::test]
    async fn each_keys_errors_by_index() {
        let rules = RuleSet::new().field(
            "images",
            vec![Rule::Each(vec![
                Rule::File,
                Rule::Mimes(vec!["png".to_string(), "jpg".to_string()]),
                Rule::Max(1),
            ])],
        );

        let input = FormInput::new()
            .with_file("images[]", upload("ok.png", encoded_image(ImageFormat::Png)))
            .with_file("images[]", upload("doc.pdf", b"%PDF-1.4 fake".to_vec()));
        let errors = run(rules, input).await;

        assert!(!errors.contains("images.0"));
        assert_eq!(
            errors.first("images.1"),
            Some("The images.1 field must be a file of type: png, jpg.")
        );
    }

    #[tokio::test]
    async fn file_size_is_measured_in_kilobytes() {
        let rules = RuleSet::new().field("images", vec![Rule::Each(vec![Rule::Max(1)])]);

        let mut exact = encoded_image(ImageFormat::Png);
        exact.resize(1024, 0);
        assert!(
            run(rules.clone(), FormInput::new().with_file("images", upload("a.png", exact)))
                .await
                .is_empty()
        );

        let mut over = encoded_image(ImageFormat::Png);
        over.resize(1025, 0);
        let errors = run(rules, FormInput::new().with_file("images", upload("a.png", over))).await;
        assert_eq!(
            errors.first("images.0"),
            Some("The images.0 field must not be greater than 1 kilobytes.")
        );
    }

    #[test]
    fn detects_supported_images_only() {
        assert_eq!(
            detect_image(&encoded_image(ImageFormat::Jpeg)),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            detect_image(&encoded_image(ImageFormat::WebP)),
            Some(ImageFormat::WebP)
        );
        assert_eq!(detect_image(b"%PDF-1.7"), None);
        assert_eq!(detect_image(b"GIF89a......"), None);
    }

    #[test]
    fn parses_common_date_shapes() {
        let expected = NaiveDate::from_ymd_opt(1853, 3, 30);
        assert_eq!(parse_date("1853-03-30"), expected);
        assert_eq!(parse_date("1853-03-30 10:00:00"), expected);
        assert_eq!(parse_date("1853-03-30T10:00:00Z"), expected);
        assert_eq!(parse_date("1853-02-30"), None);
        assert_eq!(parse_date("yesterday"), None);
    }
}
