use super::Database;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Translation {
    pub id: i64,
    pub source_text: String,
    pub translated_text: String,
    pub source_language: i64,
    pub target_language: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTranslation {
    pub source_text: String,
    pub translated_text: String,
    pub source_language: i64,
    pub target_language: i64,
}

const COLUMNS: &str = "id, source_text, translated_text, source_language, target_language";

impl Database {
    /// Insert one translation, completing the journal row `call_id` in the same transaction
    pub async fn create_translation(
        &self,
        translation: &NewTranslation,
        call_id: Option<i64>,
    ) -> sqlx::Result<Translation> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Translation>(&format!(
            "INSERT INTO translations (source_text, translated_text, source_language, target_language)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {}",
            COLUMNS
        ))
        .bind(&translation.source_text)
        .bind(&translation.translated_text)
        .bind(translation.source_language)
        .bind(translation.target_language)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(id) = call_id {
            Database::complete_provider_call(&mut tx, id).await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    pub async fn get_translation(&self, id: i64) -> sqlx::Result<Option<Translation>> {
        sqlx::query_as::<_, Translation>(&format!(
            "SELECT {} FROM translations WHERE id = ?1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_translations(&self) -> sqlx::Result<Vec<Translation>> {
        sqlx::query_as::<_, Translation>(&format!(
            "SELECT {} FROM translations ORDER BY id",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn delete_translation(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM translations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
