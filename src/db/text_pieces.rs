use super::Database;
use serde::{Deserialize, Serialize};

/// One tagged token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TextPiece {
    pub id: i64,
    pub text: String,
    pub pos_tag: String,
    pub language: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTextPiece {
    pub text: String,
    pub pos_tag: String,
    pub language: i64,
}

const COLUMNS: &str = "id, text, pos_tag, language";

impl Database {
    /// Insert all pieces in order inside one transaction.
    ///
    /// When `call_id` is given, the matching journal row is marked completed in
    /// the same transaction.
    pub async fn create_text_pieces(
        &self,
        pieces: &[NewTextPiece],
        call_id: Option<i64>,
    ) -> sqlx::Result<Vec<TextPiece>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(pieces.len());

        for piece in pieces {
            let row = sqlx::query_as::<_, TextPiece>(&format!(
                "INSERT INTO text_pieces (text, pos_tag, language)
                 VALUES (?1, ?2, ?3)
                 RETURNING {}",
                COLUMNS
            ))
            .bind(&piece.text)
            .bind(&piece.pos_tag)
            .bind(piece.language)
            .fetch_one(&mut *tx)
            .await?;
            created.push(row);
        }

        if let Some(id) = call_id {
            Database::complete_provider_call(&mut tx, id).await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    pub async fn get_text_piece(&self, id: i64) -> sqlx::Result<Option<TextPiece>> {
        sqlx::query_as::<_, TextPiece>(&format!(
            "SELECT {} FROM text_pieces WHERE id = ?1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_text_pieces(&self) -> sqlx::Result<Vec<TextPiece>> {
        sqlx::query_as::<_, TextPiece>(&format!("SELECT {} FROM text_pieces ORDER BY id", COLUMNS))
            .fetch_all(&self.pool)
            .await
    }

    pub async fn delete_text_piece(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM text_pieces WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
