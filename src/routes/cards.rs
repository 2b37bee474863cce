use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::srs::scheduler;
use crate::srs::types::{LearningStatus, ReviewStats};
use crate::state::AppState;
use crate::store::operations::cards::{Card, CardType, PartOfSpeech, UsageExample};
use crate::validation::validate_card_text;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cards).post(create_card))
        .route("/due", get(due_cards))
        .route(
            "/:card_id",
            get(get_card).put(update_card).delete(delete_card),
        )
}

#[derive(Debug, Deserialize)]
struct ListCardsQuery {
    search: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CardListResponse {
    items: Vec<Card>,
    total: u64,
}

async fn list_cards(
    Path(collection_id): Path<String>,
    Query(q): Query<ListCardsQuery>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    require_collection(&state, &collection_id)?;

    if let Some(query) = q.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let limit = q.limit.unwrap_or(50).clamp(1, 200);
        let offset = q.offset.unwrap_or(0);
        let (items, total) = state
            .store()
            .search_cards(&collection_id, query.trim(), limit, offset)?;
        return Ok(ok(CardListResponse { items, total }));
    }

    let items = state.store().list_cards(&collection_id)?;
    let total = items.len() as u64;
    Ok(ok(CardListResponse { items, total }))
}

#[derive(Debug, Deserialize)]
struct DueQuery {
    limit: Option<usize>,
}

async fn due_cards(
    Path(collection_id): Path<String>,
    Query(q): Query<DueQuery>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    require_collection(&state, &collection_id)?;
    let limit = q.limit.unwrap_or(50).clamp(1, 200);
    let due = state.store().due_cards(&collection_id, Utc::now(), limit)?;
    Ok(ok(due))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCardRequest {
    front: String,
    back: String,
    front_core: Option<String>,
    back_core: Option<String>,
    card_type: Option<CardType>,
    part_of_speech: Option<PartOfSpeech>,
    definition: Option<String>,
    synonyms: Option<Vec<String>>,
    antonyms: Option<Vec<String>>,
    usage_examples: Option<Vec<UsageExample>>,
    image_url: Option<String>,
    audio_url: Option<String>,
}

async fn create_card(
    Path(collection_id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateCardRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    require_collection(&state, &collection_id)?;
    validate_card_text("front", &req.front)
        .map_err(|msg| AppError::bad_request("CARD_INVALID_TEXT", &msg))?;
    validate_card_text("back", &req.back)
        .map_err(|msg| AppError::bad_request("CARD_INVALID_TEXT", &msg))?;

    let now = Utc::now();
    let card = Card {
        id: uuid::Uuid::new_v4().to_string(),
        collection_id: collection_id.clone(),
        front: req.front.trim().to_string(),
        back: req.back.trim().to_string(),
        front_core: req.front_core,
        back_core: req.back_core,
        card_type: req.card_type.unwrap_or(CardType::Word),
        part_of_speech: req.part_of_speech,
        definition: req.definition,
        synonyms: req.synonyms.unwrap_or_default(),
        antonyms: req.antonyms.unwrap_or_default(),
        usage_examples: req.usage_examples.unwrap_or_default(),
        image_url: req.image_url,
        audio_url: req.audio_url,
        learning_status: LearningStatus::New,
        reviewed_number: 0,
        review_stats: ReviewStats::default(),
        spaced_repetition: scheduler::initial_state(state.srs_config(), now),
        last_review_at: None,
        created_at: now,
        updated_at: now,
    };

    state.store().put_card(&card)?;
    state.store().refresh_collection_count(&collection_id)?;
    Ok(created(card))
}

async fn get_card(
    Path((collection_id, card_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let card = state
        .store()
        .get_card(&collection_id, &card_id)?
        .ok_or_else(|| AppError::not_found("Card not found"))?;
    Ok(ok(card))
}

/// Content-only update; review statistics and scheduling state belong to the
/// review engine and are not editable here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCardRequest {
    front: Option<String>,
    back: Option<String>,
    front_core: Option<String>,
    back_core: Option<String>,
    card_type: Option<CardType>,
    part_of_speech: Option<PartOfSpeech>,
    definition: Option<String>,
    synonyms: Option<Vec<String>>,
    antonyms: Option<Vec<String>>,
    usage_examples: Option<Vec<UsageExample>>,
    image_url: Option<String>,
    audio_url: Option<String>,
}

async fn update_card(
    Path((collection_id, card_id)): Path<(String, String)>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpdateCardRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let mut card = state
        .store()
        .get_card(&collection_id, &card_id)?
        .ok_or_else(|| AppError::not_found("Card not found"))?;

    if let Some(front) = req.front {
        validate_card_text("front", &front)
            .map_err(|msg| AppError::bad_request("CARD_INVALID_TEXT", &msg))?;
        card.front = front.trim().to_string();
    }
    if let Some(back) = req.back {
        validate_card_text("back", &back)
            .map_err(|msg| AppError::bad_request("CARD_INVALID_TEXT", &msg))?;
        card.back = back.trim().to_string();
    }
    if let Some(front_core) = req.front_core {
        card.front_core = Some(front_core);
    }
    if let Some(back_core) = req.back_core {
        card.back_core = Some(back_core);
    }
    if let Some(card_type) = req.card_type {
        card.card_type = card_type;
    }
    if let Some(part_of_speech) = req.part_of_speech {
        card.part_of_speech = Some(part_of_speech);
    }
    if let Some(definition) = req.definition {
        card.definition = Some(definition);
    }
    if let Some(synonyms) = req.synonyms {
        card.synonyms = synonyms;
    }
    if let Some(antonyms) = req.antonyms {
        card.antonyms = antonyms;
    }
    if let Some(usage_examples) = req.usage_examples {
        card.usage_examples = usage_examples;
    }
    if let Some(image_url) = req.image_url {
        card.image_url = Some(image_url);
    }
    if let Some(audio_url) = req.audio_url {
        card.audio_url = Some(audio_url);
    }
    card.updated_at = Utc::now();

    state.store().put_card(&card)?;
    Ok(ok(card))
}

async fn delete_card(
    Path((collection_id, card_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if !state.store().delete_card(&collection_id, &card_id)? {
        return Err(AppError::not_found("Card not found"));
    }
    state.store().refresh_collection_count(&collection_id)?;
    Ok(ok(serde_json::json!({ "deleted": true })))
}

fn require_collection(state: &AppState, collection_id: &str) -> Result<(), AppError> {
    state
        .store()
        .get_collection(collection_id)?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("Collection not found"))
}
