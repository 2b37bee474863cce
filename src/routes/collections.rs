use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;

use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::store::operations::collections::{CardCollection, DifficultyLevel};
use crate::validation::validate_collection_name;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_collections).post(create_collection))
        .route(
            "/:id",
            get(get_collection)
                .put(update_collection)
                .delete(delete_collection),
        )
}

async fn list_collections(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let collections = state.store().list_collections()?;
    Ok(ok(collections))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCollectionRequest {
    name: String,
    description: Option<String>,
    level: Option<DifficultyLevel>,
}

async fn create_collection(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateCollectionRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    validate_collection_name(&req.name)
        .map_err(|msg| AppError::bad_request("COLLECTION_INVALID_NAME", &msg))?;

    let now = Utc::now();
    let collection = CardCollection {
        id: uuid::Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
        description: req.description,
        level: req.level.unwrap_or(DifficultyLevel::Beginner),
        card_count: 0,
        created_at: now,
        updated_at: now,
    };

    state.store().upsert_collection(&collection)?;
    Ok(created(collection))
}

async fn get_collection(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let collection = state
        .store()
        .get_collection(&id)?
        .ok_or_else(|| AppError::not_found("Collection not found"))?;
    Ok(ok(collection))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCollectionRequest {
    name: Option<String>,
    description: Option<String>,
    level: Option<DifficultyLevel>,
}

async fn update_collection(
    Path(id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpdateCollectionRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let mut collection = state
        .store()
        .get_collection(&id)?
        .ok_or_else(|| AppError::not_found("Collection not found"))?;

    if let Some(name) = req.name {
        validate_collection_name(&name)
            .map_err(|msg| AppError::bad_request("COLLECTION_INVALID_NAME", &msg))?;
        collection.name = name.trim().to_string();
    }
    if let Some(description) = req.description {
        collection.description = Some(description);
    }
    if let Some(level) = req.level {
        collection.level = level;
    }
    collection.updated_at = Utc::now();

    state.store().upsert_collection(&collection)?;
    Ok(ok(collection))
}

async fn delete_collection(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if !state.store().delete_collection(&id)? {
        return Err(AppError::not_found("Collection not found"));
    }
    Ok(ok(serde_json::json!({ "deleted": true })))
}
