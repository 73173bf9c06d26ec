use super::{send_json, ProviderError, Translator};
use crate::db::Language;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "deepl";

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: [&'a str; 1],
    target_lang: String,
    source_lang: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<TranslationResult>,
}

#[derive(Debug, Deserialize)]
struct TranslationResult {
    text: String,
}

/// DeepL translation over the v2 REST API
#[derive(Debug, Clone)]
pub struct DeeplTranslator {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl DeeplTranslator {
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl Translator for DeeplTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &Language,
        source_language: &Language,
    ) -> Result<String, ProviderError> {
        // DeepL wants regional targets (PT-BR) but bare sources (EN)
        let request = TranslateRequest {
            text: [text],
            target_lang: target_language.code.to_uppercase(),
            source_lang: source_language.short_code.to_uppercase(),
        };

        let response: TranslateResponse = send_json(
            PROVIDER,
            self.client
                .post(&self.api_url)
                .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
                .json(&request),
        )
        .await?;

        response
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: PROVIDER,
                message: "no translations in response".to_string(),
            })
    }
}
