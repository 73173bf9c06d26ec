//! HTTP routes.
//!
//! Handlers stay thin: parse the path, hand the JSON body to the relevant
//! parser or manager, and map the outcome to a status code. Every error goes
//! through [`ApiError`]'s `IntoResponse`.

use crate::config::Config;
use crate::db::{Database, Language, Preferences, TextPiece, Translation};
use crate::error::{ApiError, FieldErrors, NON_FIELD_ERRORS};
use crate::languages::{self, parse_new_language};
use crate::preferences::{parse_new_preferences, parse_preferences_update};
use crate::providers::ProviderRegistry;
use crate::security::require_api_key;
use crate::tagging::NlpManager;
use crate::translation::TranslationManager;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, patch},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared handler state; everything inside is cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    nlp: NlpManager,
    translations: TranslationManager,
}

impl AppState {
    pub fn new(db: Database, registry: Arc<ProviderRegistry>, config: Arc<Config>) -> Self {
        Self {
            nlp: NlpManager::new(db.clone(), registry.clone()),
            translations: TranslationManager::new(db.clone(), registry),
            db,
            config,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/languages", get(list_languages).post(create_language))
        .route(
            "/languages/:id",
            get(get_language).put(update_language).delete(delete_language),
        )
        .route("/preferences", get(get_preferences).post(create_preferences))
        .route("/preferences/:id", patch(update_preferences))
        .route("/nlp", get(list_text_pieces).post(create_text_pieces))
        .route("/nlp/:id", get(get_text_piece).delete(delete_text_piece))
        .route("/translate", get(list_translations).post(create_translation))
        .route(
            "/translate/:id",
            get(get_translation).delete(delete_translation),
        )
        .route_layer(middleware::from_fn_with_state(
            state.config.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unwrap a JSON body, turning extractor rejections into a field-style 400
fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        ApiError::Validation(FieldErrors::single(
            NON_FIELD_ERRORS,
            format!("JSON parse error - {}", rejection.body_text()),
        ))
    })
}

/// Unwrap a record id, treating one that does not parse as an unknown record
fn record_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| ApiError::NotFound(format!("Record {}", rejection.body_text())))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

// ==================== Languages ====================

async fn list_languages(State(state): State<AppState>) -> Result<Json<Vec<Language>>, ApiError> {
    Ok(Json(state.db.list_languages().await?))
}

async fn create_language(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Language>), ApiError> {
    let new_language = parse_new_language(&json_body(body)?)?;
    let language = state.db.create_language(&new_language).await?;
    info!("Created language {} ({})", language.id, language.code);
    Ok((StatusCode::CREATED, Json(language)))
}

async fn get_language(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Language>, ApiError> {
    let id = record_id(id)?;
    Ok(Json(languages::get(&state.db, id).await?))
}

async fn update_language(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Language>, ApiError> {
    let id = record_id(id)?;
    // Unknown ids are a 404 even when the body is invalid
    languages::get(&state.db, id).await?;

    let replacement = parse_new_language(&json_body(body)?)?;
    state
        .db
        .update_language(id, &replacement)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Language {}", id)))
}

async fn delete_language(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = record_id(id)?;
    if state.db.delete_language(id).await? {
        info!("Deleted language {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Language {}", id)))
    }
}

// ==================== Preferences ====================

async fn get_preferences(State(state): State<AppState>) -> Result<Json<Preferences>, ApiError> {
    state
        .db
        .first_preferences()
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Preferences"))
}

async fn create_preferences(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Preferences>), ApiError> {
    let new_preferences = parse_new_preferences(&state.db, &json_body(body)?).await?;
    let preferences = state.db.create_preferences(&new_preferences).await?;
    info!("Created preferences {}", preferences.id);
    Ok((StatusCode::CREATED, Json(preferences)))
}

async fn update_preferences(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Preferences>, ApiError> {
    let id = record_id(id)?;
    let not_found = || ApiError::not_found(format!("Preferences {}", id));

    state.db.get_preferences(id).await?.ok_or_else(not_found)?;

    let update = parse_preferences_update(&state.db, &json_body(body)?).await?;
    state
        .db
        .update_preferences(id, &update)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

// ==================== NLP ====================

async fn list_text_pieces(
    State(state): State<AppState>,
) -> Result<Json<Vec<TextPiece>>, ApiError> {
    Ok(Json(state.db.list_text_pieces().await?))
}

async fn create_text_pieces(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<TextPiece>>), ApiError> {
    let pieces = state
        .nlp
        .create_new_processed_text(&json_body(body)?)
        .await?;
    Ok((StatusCode::CREATED, Json(pieces)))
}

async fn get_text_piece(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<TextPiece>, ApiError> {
    let id = record_id(id)?;
    state
        .db
        .get_text_piece(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Text piece {}", id)))
}

async fn delete_text_piece(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = record_id(id)?;
    if state.db.delete_text_piece(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Text piece {}", id)))
    }
}

// ==================== Translations ====================

async fn list_translations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Translation>>, ApiError> {
    Ok(Json(state.db.list_translations().await?))
}

async fn create_translation(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Translation>), ApiError> {
    let translation = state
        .translations
        .create_new_translation(&json_body(body)?)
        .await?;
    Ok((StatusCode::CREATED, Json(translation)))
}

async fn get_translation(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Translation>, ApiError> {
    let id = record_id(id)?;
    state
        .db
        .get_translation(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Translation {}", id)))
}

async fn delete_translation(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = record_id(id)?;
    if state.db.delete_translation(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Translation {}", id)))
    }
}
