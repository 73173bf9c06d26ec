use anyhow::{Context, Result};

pub const DEFAULT_DEEPL_API_URL: &str = "https://api-free.deepl.com/v2/translate";
pub const DEFAULT_GOOGLE_LANGUAGE_URL: &str =
    "https://language.googleapis.com/v1/documents:analyzeSyntax";
pub const DEFAULT_GOOGLE_TRANSLATE_URL: &str =
    "https://translation.googleapis.com/language/translate/v2";
pub const DEFAULT_GOOGLE_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub database_url: String,
    pub port: u16,
    /// When set, every API route except /health requires a matching X-API-Key header
    pub api_key: Option<String>,

    // Amazon (Comprehend + Translate)
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_region: String,
    pub aws_comprehend_url: Option<String>,
    pub aws_translate_url: Option<String>,

    // DeepL
    pub deepl_api_key: Option<String>,
    pub deepl_api_url: String,

    // Google Cloud (Natural Language + Translation)
    pub google_api_key: Option<String>,
    pub google_cloud_cred_file_name: Option<String>,
    pub google_cloud_scopes: Vec<String>,
    pub google_language_url: String,
    pub google_translate_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Server
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://lingua.db?mode=rwc".to_string()),
            port: match std::env::var("PORT") {
                Ok(port) => port
                    .parse()
                    .with_context(|| format!("PORT must be a valid port number, got '{}'", port))?,
                Err(_) => 8080,
            },
            api_key: non_empty_var("API_KEY"),

            // Amazon
            aws_access_key_id: non_empty_var("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: non_empty_var("AWS_SECRET_ACCESS_KEY"),
            aws_region: std::env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            aws_comprehend_url: non_empty_var("AWS_COMPREHEND_URL"),
            aws_translate_url: non_empty_var("AWS_TRANSLATE_URL"),

            // DeepL
            deepl_api_key: non_empty_var("DEEPL_API_KEY"),
            deepl_api_url: std::env::var("DEEPL_API_URL")
                .unwrap_or_else(|_| DEFAULT_DEEPL_API_URL.to_string()),

            // Google
            google_api_key: non_empty_var("GOOGLE_API_KEY"),
            google_cloud_cred_file_name: non_empty_var("GOOGLE_CLOUD_CRED_FILE_NAME"),
            google_cloud_scopes: std::env::var("GOOGLE_CLOUD_SCOPES")
                .map(|v| parse_scopes(&v))
                .unwrap_or_else(|_| vec![DEFAULT_GOOGLE_SCOPE.to_string()]),
            google_language_url: std::env::var("GOOGLE_LANGUAGE_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_LANGUAGE_URL.to_string()),
            google_translate_url: std::env::var("GOOGLE_TRANSLATE_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_TRANSLATE_URL.to_string()),
        })
    }

    /// Both halves of the AWS key pair, if configured
    pub fn aws_credentials(&self) -> Option<(&str, &str)> {
        match (&self.aws_access_key_id, &self.aws_secret_access_key) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

/// Read an env var, treating an empty value the same as an unset one
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split a comma-separated scope list
fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "DATABASE_URL",
        "PORT",
        "API_KEY",
        "AWS_ACCESS_KEY_ID",
        "AWS_SECRET_ACCESS_KEY",
        "AWS_REGION",
        "AWS_COMPREHEND_URL",
        "AWS_TRANSLATE_URL",
        "DEEPL_API_KEY",
        "DEEPL_API_URL",
        "GOOGLE_API_KEY",
        "GOOGLE_CLOUD_CRED_FILE_NAME",
        "GOOGLE_CLOUD_SCOPES",
        "GOOGLE_LANGUAGE_URL",
        "GOOGLE_TRANSLATE_URL",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();

        let config = Config::from_env().expect("Should load with defaults");

        assert_eq!(config.database_url, "sqlite://lingua.db?mode=rwc");
        assert_eq!(config.port, 8080);
        assert!(config.api_key.is_none());
        assert_eq!(config.aws_region, "eu-west-1");
        assert!(config.aws_credentials().is_none());
        assert_eq!(config.deepl_api_url, DEFAULT_DEEPL_API_URL);
        assert_eq!(config.google_cloud_scopes, vec![DEFAULT_GOOGLE_SCOPE]);
    }

    #[test]
    #[serial]
    fn test_from_env_reads_provider_credentials() {
        clear_env();
        std::env::set_var("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE");
        std::env::set_var("AWS_SECRET_ACCESS_KEY", "secret");
        std::env::set_var("AWS_REGION", "us-east-1");
        std::env::set_var("DEEPL_API_KEY", "deepl-key");

        let config = Config::from_env().expect("Should load");

        assert_eq!(config.aws_credentials(), Some(("AKIDEXAMPLE", "secret")));
        assert_eq!(config.aws_region, "us-east-1");
        assert_eq!(config.deepl_api_key.as_deref(), Some("deepl-key"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_half_aws_pair_is_not_credentials() {
        clear_env();
        std::env::set_var("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE");

        let config = Config::from_env().expect("Should load");
        assert!(config.aws_credentials().is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_empty_api_key_is_none() {
        clear_env();
        std::env::set_var("API_KEY", "   ");

        let config = Config::from_env().expect("Should load");
        assert!(config.api_key.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");

        let result = Config::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("PORT"));

        clear_env();
    }

    #[test]
    fn test_parse_scopes() {
        assert_eq!(
            parse_scopes("a, b ,,c"),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(parse_scopes("").is_empty());
    }
}
