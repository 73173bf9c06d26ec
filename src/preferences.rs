use crate::db::{Database, NewPreferences, PreferencesUpdate};
use crate::error::{ApiError, FieldErrors};
use crate::validation::{as_object, choice, missing_pk_message, primary_key, Object};
use serde_json::Value;

pub const SUPPORTED_TRANSLATORS: &[&str] = &["amazon", "deepl", "google"];
pub const SUPPORTED_PROCESSORS: &[&str] = &["amazon", "google"];

/// Validate a create body; all four fields are required
pub async fn parse_new_preferences(
    db: &Database,
    body: &Value,
) -> Result<NewPreferences, ApiError> {
    let fields = parse_fields(db, as_object(body)?, true).await?;

    match fields {
        PreferencesUpdate {
            translator: Some(translator),
            processor: Some(processor),
            source_lang: Some(source_lang),
            target_lang: Some(target_lang),
        } => Ok(NewPreferences {
            translator,
            processor,
            source_lang,
            target_lang,
        }),
        // parse_fields with required=true reports every missing field
        _ => Err(ApiError::Validation(FieldErrors::new())),
    }
}

/// Validate a PATCH body; absent fields are left unchanged
pub async fn parse_preferences_update(
    db: &Database,
    body: &Value,
) -> Result<PreferencesUpdate, ApiError> {
    parse_fields(db, as_object(body)?, false).await
}

async fn parse_fields(
    db: &Database,
    obj: &Object,
    required: bool,
) -> Result<PreferencesUpdate, ApiError> {
    let mut errors = FieldErrors::new();

    let translator = choice(obj, "translator", SUPPORTED_TRANSLATORS, required, &mut errors);
    let processor = choice(obj, "processor", SUPPORTED_PROCESSORS, required, &mut errors);
    let source_lang = existing_language(db, obj, "source_lang", required, &mut errors).await?;
    let target_lang = existing_language(db, obj, "target_lang", required, &mut errors).await?;

    errors.into_result()?;

    Ok(PreferencesUpdate {
        translator,
        processor,
        source_lang,
        target_lang,
    })
}

async fn existing_language(
    db: &Database,
    obj: &Object,
    field: &str,
    required: bool,
    errors: &mut FieldErrors,
) -> Result<Option<i64>, ApiError> {
    let Some(id) = primary_key(obj, field, required, errors) else {
        return Ok(None);
    };

    if db.get_language(id).await?.is_none() {
        errors.add(field, missing_pk_message(id));
        return Ok(None);
    }

    Ok(Some(id))
}
