use super::{Database, Language};
use serde::{Deserialize, Serialize};

/// Stored default provider and language choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Preferences {
    pub id: i64,
    pub translator: String,
    pub processor: String,
    pub source_lang: i64,
    pub target_lang: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPreferences {
    pub translator: String,
    pub processor: String,
    pub source_lang: i64,
    pub target_lang: i64,
}

/// Partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesUpdate {
    pub translator: Option<String>,
    pub processor: Option<String>,
    pub source_lang: Option<i64>,
    pub target_lang: Option<i64>,
}

/// Preferences with both language references loaded, ready for parameter resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferencesSnapshot {
    pub translator: String,
    pub processor: String,
    pub source_lang: Language,
    pub target_lang: Language,
}

const COLUMNS: &str = "id, translator, processor, source_lang, target_lang";

impl Database {
    pub async fn create_preferences(&self, prefs: &NewPreferences) -> sqlx::Result<Preferences> {
        sqlx::query_as::<_, Preferences>(&format!(
            "INSERT INTO preferences (translator, processor, source_lang, target_lang)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {}",
            COLUMNS
        ))
        .bind(&prefs.translator)
        .bind(&prefs.processor)
        .bind(prefs.source_lang)
        .bind(prefs.target_lang)
        .fetch_one(&self.pool)
        .await
    }

    /// The first stored row; any later rows are ignored
    pub async fn first_preferences(&self) -> sqlx::Result<Option<Preferences>> {
        sqlx::query_as::<_, Preferences>(&format!(
            "SELECT {} FROM preferences ORDER BY id LIMIT 1",
            COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_preferences(&self, id: i64) -> sqlx::Result<Option<Preferences>> {
        sqlx::query_as::<_, Preferences>(&format!(
            "SELECT {} FROM preferences WHERE id = ?1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Apply a partial update. Returns `None` if the id is unknown.
    pub async fn update_preferences(
        &self,
        id: i64,
        update: &PreferencesUpdate,
    ) -> sqlx::Result<Option<Preferences>> {
        sqlx::query_as::<_, Preferences>(&format!(
            "UPDATE preferences SET
                translator = COALESCE(?1, translator),
                processor = COALESCE(?2, processor),
                source_lang = COALESCE(?3, source_lang),
                target_lang = COALESCE(?4, target_lang)
             WHERE id = ?5
             RETURNING {}",
            COLUMNS
        ))
        .bind(update.translator.as_deref())
        .bind(update.processor.as_deref())
        .bind(update.source_lang)
        .bind(update.target_lang)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Load the first preferences row together with its two languages
    pub async fn preferences_snapshot(&self) -> sqlx::Result<Option<PreferencesSnapshot>> {
        let Some(prefs) = self.first_preferences().await? else {
            return Ok(None);
        };

        // Cascading deletes keep these references valid; a missing row means
        // the preferences were removed with it.
        let Some(source_lang) = self.get_language(prefs.source_lang).await? else {
            return Ok(None);
        };
        let Some(target_lang) = self.get_language(prefs.target_lang).await? else {
            return Ok(None);
        };

        Ok(Some(PreferencesSnapshot {
            translator: prefs.translator,
            processor: prefs.processor,
            source_lang,
            target_lang,
        }))
    }
}
