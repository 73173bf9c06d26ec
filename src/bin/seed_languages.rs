//! Seed binary - inserts a default set of languages and default preferences
//!
//! Usage:
//!   cargo run --bin seed-languages
//!
//! Languages already present (matched by long code, ignoring case) are left
//! alone, and preferences are only created when none exist, so running it
//! twice is harmless.
//!
//! Optional:
//! - DATABASE_URL (defaults to sqlite://lingua.db?mode=rwc)

use anyhow::{Context, Result};
use lingua_api::config::Config;
use lingua_api::db::{Database, NewLanguage, NewPreferences};
use tracing::info;

/// (name, code, short_code, description)
const DEFAULT_LANGUAGES: &[(&str, &str, &str, &str)] = &[
    ("British English", "EN-GB", "EN", "English as spoken in the United Kingdom"),
    ("American English", "EN-US", "EN", "English as spoken in the United States"),
    ("Irish English", "EN-IE", "EN", "English as spoken in Ireland"),
    ("Brazilian Portuguese", "PT-BR", "PT", "Portuguese as spoken in Brazil"),
    ("European Portuguese", "PT-PT", "PT", "Portuguese as spoken in Portugal"),
    ("Spanish", "ES", "ES", "Spanish as spoken in Spain"),
    ("German", "DE", "DE", "German as spoken in Germany"),
    ("French", "FR", "FR", "French as spoken in France"),
];

const DEFAULT_TRANSLATOR: &str = "deepl";
const DEFAULT_PROCESSOR: &str = "amazon";
const DEFAULT_SOURCE: &str = "EN-GB";
const DEFAULT_TARGET: &str = "PT-BR";

#[derive(Debug, Default, PartialEq, Eq)]
struct SeedReport {
    languages_created: usize,
    languages_skipped: usize,
    preferences_created: bool,
}

async fn seed(db: &Database) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for (name, code, short_code, description) in DEFAULT_LANGUAGES {
        let exists = db
            .find_language_by_code(code)
            .await?
            .is_some_and(|language| language.code.eq_ignore_ascii_case(code));

        if exists {
            report.languages_skipped += 1;
            continue;
        }

        db.create_language(&NewLanguage {
            name: name.to_string(),
            code: code.to_string(),
            short_code: short_code.to_string(),
            description: description.to_string(),
        })
        .await
        .with_context(|| format!("Failed to insert language {}", code))?;
        report.languages_created += 1;
    }

    if db.first_preferences().await?.is_none() {
        let source = db
            .find_language_by_code(DEFAULT_SOURCE)
            .await?
            .with_context(|| format!("Default source language {} missing", DEFAULT_SOURCE))?;
        let target = db
            .find_language_by_code(DEFAULT_TARGET)
            .await?
            .with_context(|| format!("Default target language {} missing", DEFAULT_TARGET))?;

        db.create_preferences(&NewPreferences {
            translator: DEFAULT_TRANSLATOR.to_string(),
            processor: DEFAULT_PROCESSOR.to_string(),
            source_lang: source.id,
            target_lang: target.id,
        })
        .await
        .context("Failed to insert default preferences")?;
        report.preferences_created = true;
    }

    Ok(report)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("seed_languages=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let db = Database::connect(&config.database_url).await?;

    let report = seed(&db).await?;

    info!(
        "Seeded {} language(s), {} already present",
        report.languages_created, report.languages_skipped
    );
    if report.preferences_created {
        info!(
            "Created default preferences: translator={}, processor={}, {} -> {}",
            DEFAULT_TRANSLATOR, DEFAULT_PROCESSOR, DEFAULT_SOURCE, DEFAULT_TARGET
        );
    } else {
        info!("Preferences already present, left unchanged");
    }

    Ok(())
}
