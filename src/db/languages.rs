use super::Database;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Language {
    pub id: i64,
    pub name: String,
    /// Long code, e.g. "PT-BR"
    pub code: String,
    /// Two-letter code, e.g. "pt"
    pub short_code: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLanguage {
    pub name: String,
    pub code: String,
    pub short_code: String,
    pub description: String,
}

const COLUMNS: &str = "id, name, code, short_code, description";

impl Database {
    pub async fn create_language(&self, language: &NewLanguage) -> sqlx::Result<Language> {
        sqlx::query_as::<_, Language>(&format!(
            "INSERT INTO languages (name, code, short_code, description)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {}",
            COLUMNS
        ))
        .bind(&language.name)
        .bind(&language.code)
        .bind(&language.short_code)
        .bind(&language.description)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get_language(&self, id: i64) -> sqlx::Result<Option<Language>> {
        sqlx::query_as::<_, Language>(&format!("SELECT {} FROM languages WHERE id = ?1", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list_languages(&self) -> sqlx::Result<Vec<Language>> {
        sqlx::query_as::<_, Language>(&format!("SELECT {} FROM languages ORDER BY id", COLUMNS))
            .fetch_all(&self.pool)
            .await
    }

    /// Replace every field of an existing language. Returns `None` if the id is unknown.
    pub async fn update_language(
        &self,
        id: i64,
        language: &NewLanguage,
    ) -> sqlx::Result<Option<Language>> {
        sqlx::query_as::<_, Language>(&format!(
            "UPDATE languages SET name = ?1, code = ?2, short_code = ?3, description = ?4
             WHERE id = ?5
             RETURNING {}",
            COLUMNS
        ))
        .bind(&language.name)
        .bind(&language.code)
        .bind(&language.short_code)
        .bind(&language.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Delete a language; dependent rows go with it. Returns whether a row was removed.
    pub async fn delete_language(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM languages WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Look a language up by long code, falling back to short code.
    ///
    /// Both comparisons ignore ASCII case. When several rows share a short
    /// code, the earliest inserted one wins.
    pub async fn find_language_by_code(&self, code: &str) -> sqlx::Result<Option<Language>> {
        let by_code = sqlx::query_as::<_, Language>(&format!(
            "SELECT {} FROM languages WHERE code = ?1 COLLATE NOCASE ORDER BY id LIMIT 1",
            COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        if by_code.is_some() {
            return Ok(by_code);
        }

        sqlx::query_as::<_, Language>(&format!(
            "SELECT {} FROM languages WHERE short_code = ?1 COLLATE NOCASE ORDER BY id LIMIT 1",
            COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
    }
}
