use super::amazon::{AmazonTagger, AmazonTranslator};
use super::deepl::DeeplTranslator;
use super::google::{GoogleCredentials, GoogleTagger, GoogleTranslator, ServiceAccountKey};
use super::sigv4::AwsCredentials;
use super::{Tagger, Translator};
use crate::config::Config;
use crate::error::ApiError;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Provider name -> adapter, one map per capability.
///
/// Built once at start-up and shared read-only afterwards.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    taggers: HashMap<String, Arc<dyn Tagger>>,
    translators: HashMap<String, Arc<dyn Translator>>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register every adapter whose credentials are present in `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::new();
        let mut registry = Self::empty();

        if let Some((access_key_id, secret_access_key)) = config.aws_credentials() {
            let credentials = AwsCredentials {
                access_key_id: access_key_id.to_string(),
                secret_access_key: secret_access_key.to_string(),
                region: config.aws_region.clone(),
            };
            registry = registry
                .with_tagger(
                    "amazon",
                    AmazonTagger::new(
                        client.clone(),
                        credentials.clone(),
                        config.aws_comprehend_url.as_deref(),
                    )?,
                )
                .with_translator(
                    "amazon",
                    AmazonTranslator::new(
                        client.clone(),
                        credentials,
                        config.aws_translate_url.as_deref(),
                    )?,
                );
        }

        if let Some(api_key) = &config.deepl_api_key {
            registry = registry.with_translator(
                "deepl",
                DeeplTranslator::new(client.clone(), api_key.clone(), config.deepl_api_url.clone()),
            );
        }

        if let Some(credentials) = google_credentials(config)? {
            registry = registry
                .with_tagger(
                    "google",
                    GoogleTagger::new(
                        client.clone(),
                        credentials.clone(),
                        config.google_language_url.clone(),
                    ),
                )
                .with_translator(
                    "google",
                    GoogleTranslator::new(client, credentials, config.google_translate_url.clone()),
                );
        }

        info!(
            "Providers registered: processors={:?}, translators={:?}",
            registry.tagger_names(),
            registry.translator_names()
        );

        Ok(registry)
    }

    pub fn with_tagger(mut self, name: &str, tagger: impl Tagger + 'static) -> Self {
        self.taggers.insert(name.to_lowercase(), Arc::new(tagger));
        self
    }

    pub fn with_translator(mut self, name: &str, translator: impl Translator + 'static) -> Self {
        self.translators
            .insert(name.to_lowercase(), Arc::new(translator));
        self
    }

    pub fn tagger(&self, name: &str) -> Result<Arc<dyn Tagger>, ApiError> {
        self.taggers
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| ApiError::UnknownProvider {
                kind: "processor",
                name: name.to_string(),
            })
    }

    pub fn translator(&self, name: &str) -> Result<Arc<dyn Translator>, ApiError> {
        self.translators
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| ApiError::UnknownProvider {
                kind: "translator",
                name: name.to_string(),
            })
    }

    pub fn tagger_names(&self) -> Vec<&str> {
        sorted_keys(&self.taggers)
    }

    pub fn translator_names(&self) -> Vec<&str> {
        sorted_keys(&self.translators)
    }
}

/// A service-account file takes precedence over an API key
fn google_credentials(config: &Config) -> Result<Option<GoogleCredentials>> {
    if let Some(path) = &config.google_cloud_cred_file_name {
        let key = ServiceAccountKey::from_file(path)?;
        return Ok(Some(GoogleCredentials::ServiceAccount {
            key,
            scopes: config.google_cloud_scopes.clone(),
        }));
    }

    Ok(config
        .google_api_key
        .as_ref()
        .map(|key| GoogleCredentials::ApiKey(key.clone())))
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<&str> {
    let mut names: Vec<&str> = map.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}
