//! Third-party NLP and translation providers.
//!
//! Every vendor integration implements exactly one of two capability traits:
//! [`Tagger`] for part-of-speech tagging or [`Translator`] for translation.
//! Adapters hold credentials, an endpoint and a shared `reqwest::Client` only,
//! so a single instance serves every request for the life of the process.
//!
//! # Language codes
//!
//! Vendors disagree on code formats. Each adapter picks the field of
//! [`Language`] its vendor expects:
//!
//! | Adapter              | Codes sent                                   |
//! |----------------------|----------------------------------------------|
//! | `AmazonTagger`       | short code                                   |
//! | `AmazonTranslator`   | long code (source and target)                |
//! | `GoogleTagger`       | none, the vendor detects the language        |
//! | `GoogleTranslator`   | target short code, source long code          |
//! | `DeeplTranslator`    | target long code, source short code, upper   |

pub mod amazon;
pub mod deepl;
pub mod google;
mod registry;
mod sigv4;

pub use registry::ProviderRegistry;

use crate::db::Language;
use async_trait::async_trait;

/// A token and its part-of-speech tag, as returned by a tagger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    pub text: String,
    pub pos_tag: String,
}

impl TaggedToken {
    pub fn new(text: impl Into<String>, pos_tag: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pos_tag: pos_tag.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{provider} returned an unexpected response: {message}")]
    MalformedResponse {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} credentials error: {message}")]
    Credentials {
        provider: &'static str,
        message: String,
    },
}

/// Part-of-speech tagging capability
#[async_trait]
pub trait Tagger: Send + Sync {
    /// Split `text` into tokens and tag each one
    async fn process(&self, text: &str, language: &Language)
        -> Result<Vec<TaggedToken>, ProviderError>;
}

/// Translation capability
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source_language` into `target_language`
    async fn translate(
        &self,
        text: &str,
        target_language: &Language,
        source_language: &Language,
    ) -> Result<String, ProviderError>;
}

/// Send a prepared request and decode a JSON body, mapping every failure to `ProviderError`
pub(crate) async fn send_json<T: serde::de::DeserializeOwned>(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|source| ProviderError::Request { provider, source })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
        return Err(ProviderError::Api {
            provider,
            status,
            body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::MalformedResponse {
            provider,
            message: e.to_string(),
        })
}


#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[derive(Debug, serde::Deserialize)]
    struct Echo {
        value: String,
    }

    #[tokio::test]
    async fn test_send_json_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": "ok"})),
            )
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let echo: Echo = send_json("test", client.post(format!("{}/echo", mock_server.uri())))
            .await
            .expect("Should succeed");

        assert_eq!(echo.value, "ok");
    }

    #[tokio::test]
    async fn test_send_json_api_error_keeps_status_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden key"))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let result: Result<Echo, _> =
            send_json("test", client.post(format!("{}/echo", mock_server.uri()))).await;

        match result {
            Err(ProviderError::Api { status, body, .. }) => {
                assert_eq!(status.as_u16(), 403);
                assert_eq!(body, "Forbidden key");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_json_malformed_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let result: Result<Echo, _> =
            send_json("test", client.post(format!("{}/echo", mock_server.uri()))).await;

        assert!(matches!(
            result,
            Err(ProviderError::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_send_json_network_error() {
        // Nothing listens on port 9 locally
        let client = reqwest::Client::new();
        let result: Result<Echo, _> = send_json("test", client.post("http://127.0.0.1:9/")).await;

        assert!(matches!(result, Err(ProviderError::Request { .. })));
    }

    #[test]
    fn test_provider_error_messages_name_the_provider() {
        let err = ProviderError::MalformedResponse {
            provider: "google",
            message: "missing tokens".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "google returned an unexpected response: missing tokens"
        );
    }
}
