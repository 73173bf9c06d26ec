//! Language directory: request parsing and code resolution.

use crate::db::{Database, Language, NewLanguage};
use crate::error::{ApiError, FieldErrors};
use crate::validation::{as_object, max_length, required_string};
use serde_json::Value;
use tracing::debug;

pub const NAME_MAX_LENGTH: usize = 50;
pub const CODE_MAX_LENGTH: usize = 8;
pub const SHORT_CODE_MAX_LENGTH: usize = 2;

/// Validate a create/replace body. Every field is required.
pub fn parse_new_language(body: &Value) -> Result<NewLanguage, ApiError> {
    let obj = as_object(body)?;
    let mut errors = FieldErrors::new();

    let name = required_string(obj, "name", &mut errors);
    let code = required_string(obj, "code", &mut errors);
    let short_code = required_string(obj, "short_code", &mut errors);
    let description = required_string(obj, "description", &mut errors);

    if let Some(name) = &name {
        max_length(name, "name", NAME_MAX_LENGTH, &mut errors);
    }
    if let Some(code) = &code {
        max_length(code, "code", CODE_MAX_LENGTH, &mut errors);
    }
    if let Some(short_code) = &short_code {
        max_length(short_code, "short_code", SHORT_CODE_MAX_LENGTH, &mut errors);
    }

    match (name, code, short_code, description) {
        (Some(name), Some(code), Some(short_code), Some(description)) if errors.is_empty() => {
            Ok(NewLanguage {
                name,
                code,
                short_code,
                description,
            })
        }
        _ => Err(ApiError::Validation(errors)),
    }
}

/// Look a language up by long code, then by short code.
///
/// Both comparisons ignore case. A short code shared by several rows resolves
/// to the earliest inserted one.
pub async fn resolve(db: &Database, code: &str) -> Result<Language, ApiError> {
    match db.find_language_by_code(code).await? {
        Some(language) => {
            debug!("Resolved '{}' to language {} ({})", code, language.id, language.code);
            Ok(language)
        }
        None => Err(ApiError::not_found(format!("Language '{}'", code))),
    }
}

/// Fetch by id, mapping a miss to `NotFound`
pub async fn get(db: &Database, id: i64) -> Result<Language, ApiError> {
    db.get_language(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Language {}", id)))
}
