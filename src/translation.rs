//! Translation requests.
//!
//! [`TranslationManager`] validates a request, resolves the translator and both
//! languages, calls the provider and stores the result.

use crate::db::{CallKind, Database, NewTranslation, Translation};
use crate::error::{ApiError, FieldErrors};
use crate::languages;
use crate::params::TranslatorParams;
use crate::providers::ProviderRegistry;
use crate::validation::{as_object, optional_string, required_string};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// A validated translation request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub source_language_code: Option<String>,
    pub target_language_code: Option<String>,
    pub translator: Option<String>,
}

impl TranslationRequest {
    pub fn from_json(body: &Value) -> Result<Self, ApiError> {
        let obj = as_object(body)?;
        let mut errors = FieldErrors::new();

        let text = required_string(obj, "text_to_be_translated", &mut errors);
        let source_language_code = optional_string(obj, "source_language_code", &mut errors);
        let target_language_code = optional_string(obj, "target_language_code", &mut errors);
        let translator = optional_string(obj, "translator", &mut errors);

        match text {
            Some(text) if errors.is_empty() => Ok(Self {
                text,
                source_language_code,
                target_language_code,
                translator,
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

#[derive(Clone)]
pub struct TranslationManager {
    db: Database,
    registry: Arc<ProviderRegistry>,
}

impl TranslationManager {
    pub fn new(db: Database, registry: Arc<ProviderRegistry>) -> Self {
        Self { db, registry }
    }

    pub async fn create_new_translation(&self, body: &Value) -> Result<Translation, ApiError> {
        let request = TranslationRequest::from_json(body)?;
        let params = self.resolve(&request).await?;
        let translator = self.registry.translator(&params.translator)?;

        let provider = params.translator.to_lowercase();
        let call_id = self
            .db
            .begin_provider_call(
                CallKind::Translation,
                &provider,
                &json!({
                    "text": params.text,
                    "source_language": params.source_language.id,
                    "target_language": params.target_language.id,
                }),
            )
            .await?;

        let translated_text = match translator
            .translate(&params.text, &params.target_language, &params.source_language)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                self.db.record_provider_failure(call_id, &e.to_string()).await;
                return Err(e.into());
            }
        };

        let new_translation = NewTranslation {
            source_text: params.text,
            translated_text,
            source_language: params.source_language.id,
            target_language: params.target_language.id,
        };

        let created = match self
            .db
            .create_translation(&new_translation, Some(call_id))
            .await
        {
            Ok(created) => created,
            Err(e) => {
                self.db.record_provider_failure(call_id, &e.to_string()).await;
                return Err(e.into());
            }
        };

        info!(
            "Translated {} -> {} with {} (translation {})",
            params.source_language.code, params.target_language.code, provider, created.id
        );

        Ok(created)
    }

    async fn resolve(&self, request: &TranslationRequest) -> Result<TranslatorParams, ApiError> {
        let source = match &request.source_language_code {
            Some(code) => Some(languages::resolve(&self.db, code).await?),
            None => None,
        };
        let target = match &request.target_language_code {
            Some(code) => Some(languages::resolve(&self.db, code).await?),
            None => None,
        };

        let preferences =
            if request.translator.is_none() || source.is_none() || target.is_none() {
                self.db.preferences_snapshot().await?
            } else {
                None
            };

        TranslatorParams::resolve(
            &request.text,
            request.translator.as_deref(),
            source,
            target,
            preferences.as_ref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CallStatus, Language, NewLanguage, NewPreferences};
    use crate::providers::test_support::StubTranslator;
    use std::sync::atomic::Ordering;

    struct Fixture {
        db: Database,
        en: Language,
        pt: Language,
    }

    async fn fixture() -> Fixture {
        let db = Database::in_memory().await.expect("Failed to create database");
        let en = db
            .create_language(&NewLanguage {
                name: "Ireland English".to_string(),
                code: "EN-IE".to_string(),
                short_code: "en".to_string(),
                description: "Language spoken in Ireland".to_string(),
            })
            .await
            .expect("create");
        let pt = db
            .create_language(&NewLanguage {
                name: "Brazilian Portuguese".to_string(),
                code: "PT-BR".to_string(),
                short_code: "pt".to_string(),
                description: "Language spoken in Brazil".to_string(),
            })
            .await
            .expect("create");
        Fixture { db, en, pt }
    }

    fn ola_translator() -> StubTranslator {
        StubTranslator {
            output: "Olá".to_string(),
            ..StubTranslator::default()
        }
    }

    fn manager(db: &Database, translator: StubTranslator) -> TranslationManager {
        let registry = ProviderRegistry::empty().with_translator("deepl", translator);
        TranslationManager::new(db.clone(), Arc::new(registry))
    }

    // ==================== Request Parsing Tests ====================

    #[test]
    fn test_from_json_requires_text() {
        match TranslationRequest::from_json(&json!({"target_language_code": "pt"})) {
            Err(ApiError::Validation(errors)) => {
                assert_eq!(
                    errors.get("text_to_be_translated"),
                    Some(&["This field is required.".to_string()][..])
                );
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_blank_text() {
        match TranslationRequest::from_json(&json!({"text_to_be_translated": "  "})) {
            Err(ApiError::Validation(errors)) => {
                assert_eq!(
                    errors.get("text_to_be_translated"),
                    Some(&["This field may not be blank.".to_string()][..])
                );
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    async fn break_journal_updates(db: &Database) {
        sqlx::query(
            "CREATE TRIGGER journal_down BEFORE UPDATE ON provider_calls
             WHEN NEW.status = 'failed'
             BEGIN SELECT RAISE(ABORT, 'journal down'); END",
        )
        .execute(db.pool())
        .await
        .expect("trigger");
    }

    // ==================== Orchestration Tests ====================

    #[tokio::test]
    async fn test_create_translation_with_explicit_fields() {
        let f = fixture().await;
        let translator = ola_translator();
        let manager = manager(&f.db, translator.clone());

        let created = manager
            .create_new_translation(&json!({
                "text_to_be_translated": "Hello",
                "source_language_code": "en",
                "target_language_code": "pt",
                "translator": "deepl"
            }))
            .await
            .expect("Should succeed");

        assert_eq!(created.source_text, "Hello");
        assert_eq!(created.translated_text, "Olá");
        assert_eq!(created.source_language, f.en.id);
        assert_eq!(created.target_language, f.pt.id);
        assert_eq!(translator.calls.load(Ordering::SeqCst), 1);

        let fetched = f
            .db
            .get_translation(created.id)
            .await
            .expect("get")
            .expect("stored");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_translation_fills_gaps_from_preferences() {
        let f = fixture().await;
        f.db.create_preferences(&NewPreferences {
            translator: "deepl".to_string(),
            processor: "amazon".to_string(),
            source_lang: f.en.id,
            target_lang: f.pt.id,
        })
        .await
        .expect("create");
        let manager = manager(&f.db, ola_translator());

        let created = manager
            .create_new_translation(&json!({
                "text_to_be_translated": "Hello",
                "target_language_code": "EN-IE"
            }))
            .await
            .expect("Should succeed");

        assert_eq!(created.source_language, f.en.id);
        assert_eq!(created.target_language, f.en.id);
    }

    #[tokio::test]
    async fn test_unknown_target_language() {
        let f = fixture().await;
        let translator = ola_translator();
        let manager = manager(&f.db, translator.clone());

        let result = manager
            .create_new_translation(&json!({
                "text_to_be_translated": "Hello",
                "source_language_code": "en",
                "target_language_code": "xx",
                "translator": "deepl"
            }))
            .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
        assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
        assert!(f.db.list_translations().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_translator() {
        let f = fixture().await;
        let manager = manager(&f.db, ola_translator());

        let result = manager
            .create_new_translation(&json!({
                "text_to_be_translated": "Hello",
                "source_language_code": "en",
                "target_language_code": "pt",
                "translator": "babelfish"
            }))
            .await;

        match result {
            Err(ApiError::UnknownProvider { kind, name }) => {
                assert_eq!(kind, "translator");
                assert_eq!(name, "babelfish");
            }
            other => panic!("Expected UnknownProvider, got {:?}", other),
        }
        assert_eq!(f.db.count_pending_provider_calls().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_persists_nothing() {
        let f = fixture().await;
        let manager = manager(
            &f.db,
            StubTranslator {
                fail: true,
                ..StubTranslator::default()
            },
        );

        let result = manager
            .create_new_translation(&json!({
                "text_to_be_translated": "Hello",
                "source_language_code": "en",
                "target_language_code": "pt",
                "translator": "deepl"
            }))
            .await;

        assert!(matches!(result, Err(ApiError::Provider(_))));
        assert!(f.db.list_translations().await.expect("list").is_empty());

        let call = f
            .db
            .get_provider_call(1)
            .await
            .expect("get")
            .expect("journal row");
        assert_eq!(call.status, CallStatus::Failed.as_str());
        assert!(call.error.as_deref().unwrap_or_default().contains("boom"));
    }

    #[tokio::test]
    async fn test_successful_call_completes_journal() {
        let f = fixture().await;
        let manager = manager(&f.db, ola_translator());

        manager
            .create_new_translation(&json!({
                "text_to_be_translated": "Hello",
                "source_language_code": "en",
                "target_language_code": "pt",
                "translator": "DeepL"
            }))
            .await
            .expect("Should succeed");

        let call = f
            .db
            .get_provider_call(1)
            .await
            .expect("get")
            .expect("journal row");
        assert_eq!(call.status, CallStatus::Completed.as_str());
        assert_eq!(call.kind, CallKind::Translation.as_str());
        assert_eq!(call.provider, "deepl");
    }

    #[tokio::test]
    async fn test_provider_error_survives_journal_failure() {
        let f = fixture().await;
        break_journal_updates(&f.db).await;
        let translator = StubTranslator {
            fail: true,
            ..StubTranslator::default()
        };
        let manager = manager(&f.db, translator.clone());

        let result = manager
            .create_new_translation(&json!({
                "text_to_be_translated": "Hello",
                "source_language_code": "en",
                "target_language_code": "pt",
                "translator": "deepl"
            }))
            .await;

        assert!(matches!(result, Err(ApiError::Provider(_))));
        assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
        assert!(f.db.list_translations().await.expect("list").is_empty());
    }
}
