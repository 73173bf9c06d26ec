//! Part-of-speech tagging requests.
//!
//! [`NlpManager`] runs a request through validation, parameter resolution,
//! the chosen tagger and finally storage, returning the stored pieces.

use crate::db::{CallKind, Database, NewTextPiece, TextPiece};
use crate::error::{ApiError, FieldErrors};
use crate::languages;
use crate::params::ProcessorParams;
use crate::providers::{ProviderRegistry, TaggedToken};
use crate::validation::{as_object, max_length, optional_string, required_string};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

pub const TEXT_PIECE_MAX_LENGTH: usize = 255;

/// A validated tagging request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggingRequest {
    pub text: String,
    pub language_code: Option<String>,
    pub processor: Option<String>,
}

impl TaggingRequest {
    pub fn from_json(body: &Value) -> Result<Self, ApiError> {
        let obj = as_object(body)?;
        let mut errors = FieldErrors::new();

        let text = required_string(obj, "text_to_be_processed", &mut errors);
        let language_code = optional_string(obj, "language_code", &mut errors);
        let processor = optional_string(obj, "processor", &mut errors);

        match text {
            Some(text) if errors.is_empty() => Ok(Self {
                text,
                language_code,
                processor,
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

#[derive(Clone)]
pub struct NlpManager {
    db: Database,
    registry: Arc<ProviderRegistry>,
}

impl NlpManager {
    pub fn new(db: Database, registry: Arc<ProviderRegistry>) -> Self {
        Self { db, registry }
    }

    /// Tag the text in `body` and store one piece per token, in the order returned
    pub async fn create_new_processed_text(
        &self,
        body: &Value,
    ) -> Result<Vec<TextPiece>, ApiError> {
        let request = TaggingRequest::from_json(body)?;
        let params = self.resolve(&request).await?;
        let tagger = self.registry.tagger(&params.processor)?;

        let provider = params.processor.to_lowercase();
        let call_id = self
            .db
            .begin_provider_call(
                CallKind::Tagging,
                &provider,
                &json!({
                    "text": params.text,
                    "language": params.language.id,
                }),
            )
            .await?;

        let tokens = match tagger.process(&params.text, &params.language).await {
            Ok(tokens) => tokens,
            Err(e) => {
                self.db.record_provider_failure(call_id, &e.to_string()).await;
                return Err(e.into());
            }
        };

        let pieces = match to_text_pieces(tokens, params.language.id) {
            Ok(pieces) => pieces,
            Err(errors) => {
                self.db
                    .record_provider_failure(call_id, "tagger returned an oversized token")
                    .await;
                return Err(ApiError::Validation(errors));
            }
        };

        let created = match self.db.create_text_pieces(&pieces, Some(call_id)).await {
            Ok(created) => created,
            Err(e) => {
                self.db.record_provider_failure(call_id, &e.to_string()).await;
                return Err(e.into());
            }
        };

        info!(
            "Tagged {} chars with {} into {} pieces ({})",
            params.text.chars().count(),
            provider,
            created.len(),
            params.language.code
        );

        Ok(created)
    }

    async fn resolve(&self, request: &TaggingRequest) -> Result<ProcessorParams, ApiError> {
        let language = match &request.language_code {
            Some(code) => Some(languages::resolve(&self.db, code).await?),
            None => None,
        };

        let preferences = if request.processor.is_none() || language.is_none() {
            self.db.preferences_snapshot().await?
        } else {
            None
        };

        ProcessorParams::resolve(
            &request.text,
            request.processor.as_deref(),
            language,
            preferences.as_ref(),
        )
    }
}

/// Stamp each token with the language, enforcing the column limits
fn to_text_pieces(
    tokens: Vec<TaggedToken>,
    language: i64,
) -> Result<Vec<NewTextPiece>, FieldErrors> {
    let mut errors = FieldErrors::new();

    for token in &tokens {
        max_length(&token.text, "text", TEXT_PIECE_MAX_LENGTH, &mut errors);
        max_length(&token.pos_tag, "pos_tag", TEXT_PIECE_MAX_LENGTH, &mut errors);
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(tokens
        .into_iter()
        .map(|token| NewTextPiece {
            text: token.text,
            pos_tag: token.pos_tag,
            language,
        })
        .collect())
}
