use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::srs::session::{CardPhase, PendingReview, ReviewSession, SessionSummary};
use crate::srs::types::ConfidenceLevel;
use crate::srs::SrsError;
use crate::state::AppState;
use crate::store::operations::cards::Card;
use crate::validation::parse_confidence;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(start_session))
        .route(
            "/sessions/:session_id",
            get(session_state).delete(abandon_session),
        )
        .route("/sessions/:session_id/reveal", post(reveal_card))
        .route("/sessions/:session_id/response", post(record_response))
        .route("/sessions/:session_id/reset", post(reset_card))
        .route("/sessions/:session_id/advance", post(advance))
        .route("/sessions/:session_id/previous", post(previous))
        .route("/sessions/:session_id/goto", post(go_to))
        .route("/sessions/:session_id/summary", get(session_summary))
        .route("/digest", get(latest_digest))
}

fn session_not_found() -> AppError {
    AppError::not_found("Review session not found or expired")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartSessionRequest {
    collection_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartSessionResponse {
    session_id: String,
    collection_id: String,
    total: usize,
    card_ids: Vec<String>,
}

async fn start_session(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<StartSessionRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    state
        .store()
        .get_collection(&req.collection_id)?
        .ok_or_else(|| AppError::not_found("Collection not found"))?;

    let cards = state.store().list_cards(&req.collection_id)?;
    let now = Utc::now();
    let session = ReviewSession::new(
        uuid::Uuid::new_v4().to_string(),
        req.collection_id.clone(),
        cards,
        state.srs_config().clone(),
        now,
    );

    let response = StartSessionResponse {
        session_id: session.id().to_string(),
        collection_id: req.collection_id,
        total: session.len(),
        card_ids: session.card_ids(),
    };
    state.sessions().insert(session).await;

    tracing::info!(
        session_id = %response.session_id,
        collection_id = %response.collection_id,
        cards = response.total,
        "Review session started"
    );
    Ok(created(response))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CurrentCard {
    card: Card,
    phase: CardPhase,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionStateResponse {
    session_id: String,
    collection_id: String,
    total: usize,
    cursor: usize,
    answered: usize,
    complete: bool,
    abandoned: bool,
    current: Option<CurrentCard>,
    summary: SessionSummary,
}

async fn session_state(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let snapshot = state
        .sessions()
        .with_session(&session_id, |session| SessionStateResponse {
            session_id: session.id().to_string(),
            collection_id: session.collection_id().to_string(),
            total: session.len(),
            cursor: session.cursor(),
            answered: session.answered_count(),
            complete: session.is_complete(),
            abandoned: session.is_abandoned(),
            current: session.current().map(|(card, phase)| CurrentCard {
                card: card.clone(),
                phase,
            }),
            summary: session.summary(),
        })
        .await
        .ok_or_else(session_not_found)?;

    Ok(ok(snapshot))
}

async fn abandon_session(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    state
        .sessions()
        .with_session(&session_id, |session| session.abandon())
        .await
        .ok_or_else(session_not_found)?;

    tracing::info!(session_id = %session_id, "Review session abandoned");
    Ok(ok(serde_json::json!({ "abandoned": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardActionRequest {
    card_id: String,
}

async fn reveal_card(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CardActionRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    state
        .sessions()
        .with_session(&session_id, |session| {
            session.reveal(&req.card_id, Utc::now())
        })
        .await
        .ok_or_else(session_not_found)??;

    Ok(ok(serde_json::json!({
        "cardId": req.card_id,
        "phase": "revealed",
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordResponseRequest {
    card_id: String,
    /// 1 = very hard .. 5 = very easy.
    confidence: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordResponseResponse {
    card: Card,
    correct: bool,
    response_time_ms: u64,
    summary: SessionSummary,
}

/// Grade a card. The graded snapshot is computed inside the session, written
/// to the store, and only then committed into the session aggregates. If the
/// write fails the computed response stays pending: re-sending the same grade
/// retries the write without recomputing anything.
async fn record_response(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RecordResponseRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let confidence = parse_confidence(req.confidence)
        .map_err(|msg| AppError::bad_request("CONFIDENCE_INVALID", &msg))?;

    let card_id = req.card_id.clone();
    let pending: PendingReview = state
        .sessions()
        .with_session(&session_id, |session| {
            record_or_resume(session, &card_id, confidence)
        })
        .await
        .ok_or_else(session_not_found)??;

    // Persist outside the registry lock; on failure the pending response is
    // retained in the session for a recomputation-free retry.
    state.store().put_card(&pending.card)?;

    let (card, summary) = state
        .sessions()
        .with_session(&session_id, |session| {
            let card = session.commit_response(&card_id, Utc::now())?;
            Ok::<_, SrsError>((card, session.summary()))
        })
        .await
        .ok_or_else(session_not_found)??;

    Ok(ok(RecordResponseResponse {
        card,
        correct: pending.is_correct,
        response_time_ms: pending.response_time_ms,
        summary,
    }))
}

/// A retry with the same grade reuses the pending snapshot instead of
/// recomputing; a different grade while the first is unresolved is a real
/// conflict the client has to sort out.
fn record_or_resume(
    session: &mut ReviewSession,
    card_id: &str,
    confidence: ConfidenceLevel,
) -> Result<PendingReview, SrsError> {
    match session.record_response(card_id, confidence, Utc::now()) {
        Ok(pending) => Ok(pending),
        Err(SrsError::InFlightConflict { .. }) => match session.pending_review(card_id) {
            Some(pending) if pending.confidence == confidence => Ok(pending.clone()),
            _ => Err(SrsError::InFlightConflict {
                card_id: card_id.to_string(),
            }),
        },
        Err(err) => Err(err),
    }
}

async fn reset_card(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CardActionRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    state
        .sessions()
        .with_session(&session_id, |session| {
            session.reset_card(&req.card_id, Utc::now())
        })
        .await
        .ok_or_else(session_not_found)??;

    Ok(ok(serde_json::json!({
        "cardId": req.card_id,
        "phase": "hidden",
    })))
}

async fn advance(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let cursor = state
        .sessions()
        .with_session(&session_id, |session| session.advance())
        .await
        .ok_or_else(session_not_found)??;
    Ok(ok(serde_json::json!({ "cursor": cursor })))
}

async fn previous(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let cursor = state
        .sessions()
        .with_session(&session_id, |session| session.previous())
        .await
        .ok_or_else(session_not_found)??;
    Ok(ok(serde_json::json!({ "cursor": cursor })))
}

#[derive(Debug, Deserialize)]
struct GoToRequest {
    index: usize,
}

async fn go_to(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<GoToRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let cursor = state
        .sessions()
        .with_session(&session_id, |session| session.go_to(req.index))
        .await
        .ok_or_else(session_not_found)??;
    Ok(ok(serde_json::json!({ "cursor": cursor })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    #[serde(flatten)]
    summary: SessionSummary,
    accuracy: f64,
    answered: usize,
    total: usize,
}

async fn session_summary(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let response = state
        .sessions()
        .with_session(&session_id, |session| {
            let summary = session.summary();
            let accuracy = if summary.studied > 0 {
                f64::from(summary.correct) / f64::from(summary.studied)
            } else {
                0.0
            };
            SummaryResponse {
                summary,
                accuracy,
                answered: session.answered_count(),
                total: session.len(),
            }
        })
        .await
        .ok_or_else(session_not_found)?;

    Ok(ok(response))
}

async fn latest_digest(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let digest = state
        .store()
        .latest_due_digest()?
        .ok_or_else(|| AppError::not_found("No due digest generated yet"))?;
    Ok(ok(digest))
}
