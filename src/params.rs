//! Parameter resolution for tagging and translation requests.
//!
//! Explicit request values always win. Anything the request leaves out is taken
//! from the stored preferences; if no preferences exist the missing field is
//! reported as a validation error. Language codes are resolved to records by
//! the caller before they get here, so these functions never touch storage.

use crate::db::{Language, PreferencesSnapshot};
use crate::error::{ApiError, FieldErrors};

pub const NO_PREFERENCES: &str =
    "This field is required because no default preferences are stored.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorParams {
    pub processor: String,
    pub text: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorParams {
    pub translator: String,
    pub text: String,
    pub source_language: Language,
    pub target_language: Language,
}

/// Take the explicit value or fall back to preferences, recording `field` when neither exists
fn pick<T>(
    explicit: Option<T>,
    preferences: Option<&PreferencesSnapshot>,
    fallback: impl FnOnce(&PreferencesSnapshot) -> T,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<T> {
    match (explicit, preferences) {
        (Some(value), _) => Some(value),
        (None, Some(prefs)) => Some(fallback(prefs)),
        (None, None) => {
            errors.add(field, NO_PREFERENCES);
            None
        }
    }
}

impl ProcessorParams {
    /// The tagging language falls back to the preferred target language
    pub fn resolve(
        text: &str,
        processor: Option<&str>,
        language: Option<Language>,
        preferences: Option<&PreferencesSnapshot>,
    ) -> Result<Self, ApiError> {
        let mut errors = FieldErrors::new();

        let processor = pick(
            processor.map(str::to_string),
            preferences,
            |p| p.processor.clone(),
            "processor",
            &mut errors,
        );
        let language = pick(
            language,
            preferences,
            |p| p.target_lang.clone(),
            "language_code",
            &mut errors,
        );

        match (processor, language) {
            (Some(processor), Some(language)) => Ok(Self {
                processor,
                text: text.to_string(),
                language,
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

impl TranslatorParams {
    pub fn resolve(
        text: &str,
        translator: Option<&str>,
        source_language: Option<Language>,
        target_language: Option<Language>,
        preferences: Option<&PreferencesSnapshot>,
    ) -> Result<Self, ApiError> {
        let mut errors = FieldErrors::new();

        let translator = pick(
            translator.map(str::to_string),
            preferences,
            |p| p.translator.clone(),
            "translator",
            &mut errors,
        );
        let source_language = pick(
            source_language,
            preferences,
            |p| p.source_lang.clone(),
            "source_language_code",
            &mut errors,
        );
        let target_language = pick(
            target_language,
            preferences,
            |p| p.target_lang.clone(),
            "target_language_code",
            &mut errors,
        );

        match (translator, source_language, target_language) {
            (Some(translator), Some(source_language), Some(target_language)) => Ok(Self {
                translator,
                text: text.to_string(),
                source_language,
                target_language,
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn language(id: i64, code: &str, short_code: &str) -> Language {
        Language {
            id,
            name: format!("Language {}", code),
            code: code.to_string(),
            short_code: short_code.to_string(),
            description: "test".to_string(),
        }
    }

    fn preferences() -> PreferencesSnapshot {
        PreferencesSnapshot {
            translator: "deepl".to_string(),
            processor: "amazon".to_string(),
            source_lang: language(1, "EN-IE", "en"),
            target_lang: language(2, "PT-BR", "pt"),
        }
    }

    // ==================== ProcessorParams Tests ====================

    #[test]
    fn test_processor_all_defaults() {
        let prefs = preferences();
        let params =
            ProcessorParams::resolve("Olá", None, None, Some(&prefs)).expect("Should resolve");

        assert_eq!(params.processor, "amazon");
        assert_eq!(params.language, prefs.target_lang);
        assert_eq!(params.text, "Olá");
    }

    #[test]
    fn test_processor_explicit_overrides() {
        let prefs = preferences();
        let de = language(3, "DE-DE", "de");

        let params = ProcessorParams::resolve("Hallo", Some("google"), Some(de.clone()), Some(&prefs))
            .expect("Should resolve");

        assert_eq!(params.processor, "google");
        assert_eq!(params.language, de);
    }

    #[test]
    fn test_processor_without_preferences_needs_everything() {
        match ProcessorParams::resolve("Olá", None, None, None) {
            Err(ApiError::Validation(errors)) => {
                assert_eq!(errors.get("processor"), Some(&[NO_PREFERENCES.to_string()][..]));
                assert_eq!(
                    errors.get("language_code"),
                    Some(&[NO_PREFERENCES.to_string()][..])
                );
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_processor_without_preferences_fully_explicit() {
        let pt = language(2, "PT-BR", "pt");
        let params = ProcessorParams::resolve("Olá", Some("amazon"), Some(pt.clone()), None)
            .expect("Should resolve");

        assert_eq!(params.processor, "amazon");
        assert_eq!(params.language, pt);
    }

    #[test]
    fn test_processor_name_kept_verbatim() {
        // Case folding happens at registry lookup
        let prefs = preferences();
        let params = ProcessorParams::resolve("x", Some("Google"), None, Some(&prefs))
            .expect("Should resolve");
        assert_eq!(params.processor, "Google");
    }

    // ==================== TranslatorParams Tests ====================

    #[test]
    fn test_translator_all_defaults() {
        let prefs = preferences();
        let params = TranslatorParams::resolve("Hello", None, None, None, Some(&prefs))
            .expect("Should resolve");

        assert_eq!(params.translator, "deepl");
        assert_eq!(params.source_language, prefs.source_lang);
        assert_eq!(params.target_language, prefs.target_lang);
    }

    #[test]
    fn test_translator_mixed_explicit_and_default() {
        let prefs = preferences();
        let de = language(3, "DE-DE", "de");

        let params = TranslatorParams::resolve("Hello", None, None, Some(de.clone()), Some(&prefs))
            .expect("Should resolve");

        assert_eq!(params.translator, "deepl");
        assert_eq!(params.source_language, prefs.source_lang);
        assert_eq!(params.target_language, de);
    }

    #[test]
    fn test_translator_without_preferences_names_missing_fields() {
        let en = language(1, "EN-IE", "en");

        match TranslatorParams::resolve("Hello", Some("amazon"), Some(en), None, None) {
            Err(ApiError::Validation(errors)) => {
                assert!(errors.get("translator").is_none());
                assert!(errors.get("source_language_code").is_none());
                assert!(errors.get("target_language_code").is_some());
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    // ==================== Property Tests ====================

    fn arb_language() -> impl Strategy<Value = Language> {
        (100i64..200, "[A-Z]{2}-[A-Z]{2}", "[a-z]{2}")
            .prop_map(|(id, code, short_code)| language(id, &code, &short_code))
    }

    proptest! {
        #[test]
        fn prop_processor_explicit_wins_and_omitted_falls_back(
            text in ".{0,40}",
            processor in proptest::option::of("[a-z]{3,8}"),
            lang in proptest::option::of(arb_language()),
        ) {
            let prefs = preferences();
            let params = ProcessorParams::resolve(&text, processor.as_deref(), lang.clone(), Some(&prefs))
                .expect("Should resolve with preferences");

            prop_assert_eq!(params.text, text);
            prop_assert_eq!(params.processor, processor.unwrap_or_else(|| prefs.processor.clone()));
            prop_assert_eq!(params.language, lang.unwrap_or_else(|| prefs.target_lang.clone()));
        }

        #[test]
        fn prop_translator_explicit_wins_and_omitted_falls_back(
            translator in proptest::option::of("[a-z]{3,8}"),
            source in proptest::option::of(arb_language()),
            target in proptest::option::of(arb_language()),
        ) {
            let prefs = preferences();
            let params = TranslatorParams::resolve(
                "Hello",
                translator.as_deref(),
                source.clone(),
                target.clone(),
                Some(&prefs),
            )
            .expect("Should resolve with preferences");

            prop_assert_eq!(params.translator, translator.unwrap_or_else(|| prefs.translator.clone()));
            prop_assert_eq!(params.source_language, source.unwrap_or_else(|| prefs.source_lang.clone()));
            prop_assert_eq!(params.target_language, target.unwrap_or_else(|| prefs.target_lang.clone()));
        }

        #[test]
        fn prop_fully_explicit_never_needs_preferences(
            translator in "[a-z]{3,8}",
            source in arb_language(),
            target in arb_language(),
        ) {
            let params = TranslatorParams::resolve(
                "Hello",
                Some(&translator),
                Some(source.clone()),
                Some(target.clone()),
                None,
            )
            .expect("Should resolve without preferences");

            prop_assert_eq!(params.translator, translator);
            prop_assert_eq!(params.source_language, source);
            prop_assert_eq!(params.target_language, target);
        }
    }
}
