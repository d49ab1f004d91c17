use crate::constants::limits::MAX_STRING_LENGTH;
use crate::models::artist::ArtistFields;

use super::{FormInput, ReferenceLookup, Rule, RuleSet, ValidationError, parse_date};

/// Rules for the artist form. Create and update share them.
#[must_use]
pub fn rules() -> RuleSet {
    let max = i64::try_from(MAX_STRING_LENGTH).unwrap_or(i64::MAX);

    RuleSet::new()
        .field("name", vec![Rule::Required, Rule::String, Rule::Max(max)])
        .field("bio", vec![Rule::String])
        .field("birth_date", vec![Rule::Date])
        .field("death_date", vec![Rule::Date, Rule::After("birth_date")])
}

/// Validates the artist form and returns the typed fields.
pub async fn validate(
    input: &FormInput,
    lookup: &dyn ReferenceLookup,
) -> Result<ArtistFields, ValidationError> {
    rules().validate(input, lookup).await?;

    Ok(ArtistFields {
        name: input.text("name").unwrap_or_default().to_string(),
        bio: input.text("bio").map(str::to_string),
        birth_date: input.text("birth_date").and_then(parse_date),
        death_date: input.text("death_date").and_then(parse_date),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::tests::StubLookup;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn valid_artist_is_normalized() {
        let input = FormInput::new()
            .with_text("name", "  Berthe Morisot ")
            .with_text("bio", "")
            .with_text("birth_date", "1841-01-14")
            .with_text("death_date", "1895-03-02");

        let fields = validate(&input, &StubLookup::default()).await.unwrap();
        assert_eq!(fields.name, "Berthe Morisot");
        assert_eq!(fields.bio, None);
        assert_eq!(fields.birth_date, NaiveDate::from_ymd_opt(1841, 1, 14));
        assert_eq!(fields.death_date, NaiveDate::from_ymd_opt(1895, 3, 2));
    }

    #[tokio::test]
    async fn equal_dates_fail_on_death_date() {
        let input = FormInput::new()
            .with_text("name", "Same Day")
            .with_text("birth_date", "1900-01-01")
            .with_text("death_date", "1900-01-01");

        let err = validate(&input, &StubLookup::default()).await.unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("death_date"));
        assert!(!errors.contains("birth_date"));
    }

    #[tokio::test]
    async fn name_is_required_and_bounded() {
        let err = validate(&FormInput::new(), &StubLookup::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().first("name"),
            Some("The name field is required.")
        );

        let long = "x".repeat(256);
        let err = validate(&FormInput::new().with_text("name", &long), &StubLookup::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().first("name"),
            Some("The name field must not be greater than 255 characters.")
        );

        let exact = "x".repeat(255);
        assert!(
            validate(&FormInput::new().with_text("name", &exact), &StubLookup::default())
                .await
                .is_ok()
        );
    }
}
