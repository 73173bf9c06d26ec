//! Google Cloud Natural Language (tagging) and Translation v2.
//!
//! Requests authenticate either with an API key or with a service account. A
//! service account signs a JWT assertion and trades it at the key file's
//! `token_uri` for a short-lived bearer token on every call.

use super::{send_json, ProviderError, TaggedToken, Tagger, Translator};
use crate::db::Language;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

const PROVIDER: &str = "google";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// The parts of a service-account key file needed to mint tokens
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read service account file {}", path.display()))?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid service account file {}", path.display()))?;

        EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("Service account private_key is not a valid RSA PEM")?;

        Ok(key)
    }
}

#[derive(Debug, Clone)]
pub enum GoogleCredentials {
    ApiKey(String),
    ServiceAccount {
        key: ServiceAccountKey,
        scopes: Vec<String>,
    },
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Authenticated JSON POSTs to Google endpoints
#[derive(Debug, Clone)]
struct GoogleClient {
    client: reqwest::Client,
    credentials: GoogleCredentials,
}

impl GoogleClient {
    async fn access_token(
        &self,
        key: &ServiceAccountKey,
        scopes: &[String],
    ) -> Result<String, ProviderError> {
        let credentials_error = |message: String| ProviderError::Credentials {
            provider: PROVIDER,
            message,
        };

        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &key.client_email,
            scope: scopes.join(" "),
            aud: &key.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| credentials_error(format!("invalid private key: {}", e)))?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| credentials_error(format!("failed to sign assertion: {}", e)))?;

        debug!("Exchanging service account assertion for {}", key.client_email);

        let token: TokenResponse = send_json(
            PROVIDER,
            self.client
                .post(&key.token_uri)
                .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())]),
        )
        .await?;

        Ok(token.access_token)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        let request = self.client.post(url).json(body);

        let request = match &self.credentials {
            GoogleCredentials::ApiKey(api_key) => request.header("x-goog-api-key", api_key),
            GoogleCredentials::ServiceAccount { key, scopes } => {
                let token = self.access_token(key, scopes).await?;
                request.bearer_auth(token)
            }
        };

        send_json(PROVIDER, request).await
    }
}

// ==================== Natural Language ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeSyntaxRequest<'a> {
    document: Document<'a>,
    encoding_type: &'static str,
}

#[derive(Debug, Serialize)]
struct Document<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnalyzeSyntaxResponse {
    #[serde(default)]
    tokens: Vec<Token>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Token {
    text: TextSpan,
    part_of_speech: PartOfSpeech,
}

#[derive(Debug, Deserialize)]
struct TextSpan {
    content: String,
}

#[derive(Debug, Deserialize)]
struct PartOfSpeech {
    tag: String,
}

/// Part-of-speech tagging through `documents:analyzeSyntax`
#[derive(Debug, Clone)]
pub struct GoogleTagger {
    api: GoogleClient,
    url: String,
}

impl GoogleTagger {
    pub fn new(
        client: reqwest::Client,
        credentials: GoogleCredentials,
        url: impl Into<String>,
    ) -> Self {
        Self {
            api: GoogleClient {
                client,
                credentials,
            },
            url: url.into(),
        }
    }
}

#[async_trait]
impl Tagger for GoogleTagger {
    async fn process(
        &self,
        text: &str,
        _language: &Language,
    ) -> Result<Vec<TaggedToken>, ProviderError> {
        // No language hint: Google detects it from the content
        let request = AnalyzeSyntaxRequest {
            document: Document {
                kind: "PLAIN_TEXT",
                content: text,
            },
            encoding_type: "UTF8",
        };

        let response: AnalyzeSyntaxResponse = self.api.post(&self.url, &request).await?;

        Ok(response
            .tokens
            .into_iter()
            .map(|token| TaggedToken::new(token.text.content, token.part_of_speech.tag))
            .collect())
    }
}

// ==================== Translation ====================

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    source: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslatedText {
    translated_text: String,
}

/// Translation through the Cloud Translation v2 REST API
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    api: GoogleClient,
    url: String,
}

impl GoogleTranslator {
    pub fn new(
        client: reqwest::Client,
        credentials: GoogleCredentials,
        url: impl Into<String>,
    ) -> Self {
        Self {
            api: GoogleClient {
                client,
                credentials,
            },
            url: url.into(),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &Language,
        source_language: &Language,
    ) -> Result<String, ProviderError> {
        let request = TranslateRequest {
            q: text,
            target: &target_language.short_code,
            source: &source_language.code,
            format: "text",
        };

        let response: TranslateResponse = self.api.post(&self.url, &request).await?;

        response
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: PROVIDER,
                message: "no translations in response".to_string(),
            })
    }
}
