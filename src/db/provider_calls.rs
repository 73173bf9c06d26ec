//! Write-ahead journal of vendor calls.
//!
//! A `pending` row is written before a provider is invoked. It is flipped to
//! `completed` in the same transaction that stores the result, or to `failed`
//! when the provider errors. Rows still `pending` after a restart mark calls
//! whose result never reached the database.

use super::Database;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Tagging,
    Translation,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::Tagging => "tagging",
            CallKind::Translation => "translation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Pending,
    Completed,
    Failed,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Pending => "pending",
            CallStatus::Completed => "completed",
            CallStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProviderCall {
    pub id: i64,
    pub kind: String,
    pub provider: String,
    /// JSON of the resolved parameters sent to the provider
    pub payload: String,
    pub status: String,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Database {
    /// Record a call that is about to be made. Returns the journal id.
    pub async fn begin_provider_call(
        &self,
        kind: CallKind,
        provider: &str,
        payload: &serde_json::Value,
    ) -> sqlx::Result<i64> {
        sqlx::query_scalar(
            "INSERT INTO provider_calls (kind, provider, payload, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
        )
        .bind(kind.as_str())
        .bind(provider)
        .bind(payload.to_string())
        .bind(CallStatus::Pending.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn fail_provider_call(&self, id: i64, error: &str) -> sqlx::Result<()> {
        sqlx::query(
            "UPDATE provider_calls SET status = ?1, error = ?2, finished_at = ?3 WHERE id = ?4",
        )
        .bind(CallStatus::Failed.as_str())
        .bind(error)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Mark a call failed, logging journal errors instead of returning them
    pub async fn record_provider_failure(&self, id: i64, error: &str) {
        if let Err(journal_err) = self.fail_provider_call(id, error).await {
            warn!("Failed to mark provider call {} failed: {}", id, journal_err);
        }
    }

    /// Mark a call completed on the caller's connection, so it commits with the result rows
    pub(super) async fn complete_provider_call(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE provider_calls SET status = ?1, finished_at = ?2 WHERE id = ?3")
            .bind(CallStatus::Completed.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn get_provider_call(&self, id: i64) -> sqlx::Result<Option<ProviderCall>> {
        sqlx::query_as::<_, ProviderCall>(
            "SELECT id, kind, provider, payload, status, error, created_at, finished_at
             FROM provider_calls WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn count_pending_provider_calls(&self) -> sqlx::Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM provider_calls WHERE status = ?1")
            .bind(CallStatus::Pending.as_str())
            .fetch_one(&self.pool)
            .await
    }
}
