//! Amazon Comprehend (tagging) and Amazon Translate (translation).
//!
//! Both services speak AWS JSON 1.1: a signed POST to the service root with an
//! `X-Amz-Target` header naming the operation.

use super::sigv4::{self, AwsCredentials};
use super::{send_json, ProviderError, TaggedToken, Tagger, Translator};
use crate::db::Language;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

const PROVIDER: &str = "amazon";
const DETECT_SYNTAX_TARGET: &str = "Comprehend_20171127.DetectSyntax";
const TRANSLATE_TEXT_TARGET: &str = "AWSShineFrontendService_20170701.TranslateText";

/// Signs and sends AWS JSON 1.1 calls for one service
#[derive(Debug, Clone)]
struct AwsJsonClient {
    client: reqwest::Client,
    credentials: AwsCredentials,
    service: &'static str,
    endpoint: reqwest::Url,
    host: String,
}

impl AwsJsonClient {
    fn new(
        client: reqwest::Client,
        credentials: AwsCredentials,
        service: &'static str,
        endpoint: Option<&str>,
    ) -> Result<Self> {
        let endpoint = match endpoint {
            Some(url) => url.to_string(),
            None => format!("https://{}.{}.amazonaws.com/", service, credentials.region),
        };
        let endpoint = reqwest::Url::parse(&endpoint)
            .with_context(|| format!("Invalid {} endpoint: {}", service, endpoint))?;
        let host = sigv4::host_header(&endpoint)
            .with_context(|| format!("{} endpoint has no host: {}", service, endpoint))?;

        Ok(Self {
            client,
            credentials,
            service,
            endpoint,
            host,
        })
    }

    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        target: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        let payload = serde_json::to_vec(body).map_err(|e| ProviderError::MalformedResponse {
            provider: PROVIDER,
            message: format!("failed to encode request: {}", e),
        })?;

        let signed = sigv4::sign(
            &self.credentials,
            self.service,
            &self.host,
            self.endpoint.path(),
            target,
            &payload,
            Utc::now(),
        );

        let request = self
            .client
            .post(self.endpoint.clone())
            .header("Content-Type", sigv4::CONTENT_TYPE)
            .header("X-Amz-Date", signed.amz_date)
            .header("X-Amz-Target", target)
            .header("Authorization", signed.authorization)
            .body(payload);

        send_json(PROVIDER, request).await
    }
}

// ==================== Comprehend ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DetectSyntaxRequest<'a> {
    text: &'a str,
    language_code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetectSyntaxResponse {
    syntax_tokens: Vec<SyntaxToken>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SyntaxToken {
    text: String,
    part_of_speech: PartOfSpeech,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PartOfSpeech {
    tag: String,
}

/// Part-of-speech tagging through Comprehend `DetectSyntax`
#[derive(Debug, Clone)]
pub struct AmazonTagger {
    api: AwsJsonClient,
}

impl AmazonTagger {
    pub fn new(
        client: reqwest::Client,
        credentials: AwsCredentials,
        endpoint: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            api: AwsJsonClient::new(client, credentials, "comprehend", endpoint)?,
        })
    }
}

#[async_trait]
impl Tagger for AmazonTagger {
    async fn process(
        &self,
        text: &str,
        language: &Language,
    ) -> Result<Vec<TaggedToken>, ProviderError> {
        // Comprehend only accepts two-letter codes
        let request = DetectSyntaxRequest {
            text,
            language_code: &language.short_code,
        };

        let response: DetectSyntaxResponse = self.api.call(DETECT_SYNTAX_TARGET, &request).await?;

        Ok(response
            .syntax_tokens
            .into_iter()
            .map(|token| TaggedToken::new(token.text, token.part_of_speech.tag))
            .collect())
    }
}

// ==================== Translate ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TranslateTextRequest<'a> {
    text: &'a str,
    source_language_code: &'a str,
    target_language_code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TranslateTextResponse {
    translated_text: String,
}

/// Translation through Amazon Translate `TranslateText`
#[derive(Debug, Clone)]
pub struct AmazonTranslator {
    api: AwsJsonClient,
}

impl AmazonTranslator {
    pub fn new(
        client: reqwest::Client,
        credentials: AwsCredentials,
        endpoint: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            api: AwsJsonClient::new(client, credentials, "translate", endpoint)?,
        })
    }
}

#[async_trait]
impl Translator for AmazonTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &Language,
        source_language: &Language,
    ) -> Result<String, ProviderError> {
        let request = TranslateTextRequest {
            text,
            source_language_code: &source_language.code,
            target_language_code: &target_language.code,
        };

        let response: TranslateTextResponse =
            self.api.call(TRANSLATE_TEXT_TARGET, &request).await?;

        Ok(response.translated_text)
    }
}
