//! Error types surfaced by the API.
//!
//! Every failure a handler can produce funnels through [`ApiError`], which
//! knows how to render itself as an HTTP response. Field-level validation
//! problems carry a [`FieldErrors`] map that is returned to the client as-is.

use crate::providers::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{error, warn};

pub const FIELD_REQUIRED: &str = "This field is required.";
pub const FIELD_BLANK: &str = "This field may not be blank.";
pub const FIELD_NOT_STRING: &str = "Not a valid string.";
pub const FIELD_NULL: &str = "This field may not be null.";
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Field name -> list of messages, rendered verbatim as the 400 body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a map holding a single message
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("unknown {kind} '{name}'")]
    UnknownProvider { kind: &'static str, name: String },

    #[error("upstream provider failure: {0}")]
    Provider(#[from] ProviderError),

    #[error("missing or invalid API key")]
    Unauthorized,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        ApiError::NotFound(format!("{} not found", what))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnknownProvider { .. } => StatusCode::BAD_REQUEST,
            ApiError::Provider(_) => StatusCode::BAD_GATEWAY,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct Detail {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(errors) => (status, Json(errors)).into_response(),
            ApiError::NotFound(message) => {
                tracing::debug!("{}", message);
                (
                    status,
                    Json(Detail {
                        detail: "Not found.".to_string(),
                    }),
                )
                    .into_response()
            }
            ApiError::Provider(e) => {
                warn!("Provider call failed: {}", e);
                (
                    status,
                    Json(Detail {
                        detail: format!("Upstream provider failure: {}", e),
                    }),
                )
                    .into_response()
            }
            ApiError::Database(e) => {
                error!("Database error: {}", e);
                (
                    status,
                    Json(Detail {
                        detail: "Internal server error".to_string(),
                    }),
                )
                    .into_response()
            }
            other => (
                status,
                Json(Detail {
                    detail: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}
