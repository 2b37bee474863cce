use axum::http::Method;
use axum::Router;
use serde_json::Value;

use super::http::{request, response_json};

/// Create a collection over the API and return its id.
pub async fn create_collection(app: &Router, name: &str) -> String {
    let resp = request(
        app,
        Method::POST,
        "/api/collections",
        Some(serde_json::json!({ "name": name })),
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, 201, "create collection failed: {body}");
    body["data"]["id"]
        .as_str()
        .expect("collection id")
        .to_string()
}

/// Create a word card over the API and return its id.
pub async fn create_card(app: &Router, collection_id: &str, front: &str, back: &str) -> String {
    let resp = request(
        app,
        Method::POST,
        &format!("/api/collections/{collection_id}/cards"),
        Some(serde_json::json!({ "front": front, "back": back })),
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, 201, "create card failed: {body}");
    body["data"]["id"].as_str().expect("card id").to_string()
}

/// Start a review session for a collection, returning the session id and the
/// ordered card ids.
pub async fn start_session(app: &Router, collection_id: &str) -> (String, Vec<String>) {
    let resp = request(
        app,
        Method::POST,
        "/api/review/sessions",
        Some(serde_json::json!({ "collectionId": collection_id })),
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, 201, "start session failed: {body}");

    let session_id = body["data"]["sessionId"]
        .as_str()
        .expect("session id")
        .to_string();
    let card_ids = body["data"]["cardIds"]
        .as_array()
        .expect("card ids")
        .iter()
        .map(|v| v.as_str().expect("card id").to_string())
        .collect();
    (session_id, card_ids)
}

/// Reveal then grade one card in a session; returns the response body.
pub async fn review_card(
    app: &Router,
    session_id: &str,
    card_id: &str,
    confidence: u8,
) -> Value {
    let reveal = request(
        app,
        Method::POST,
        &format!("/api/review/sessions/{session_id}/reveal"),
        Some(serde_json::json!({ "cardId": card_id })),
    )
    .await;
    let (status, _, body) = response_json(reveal).await;
    assert_eq!(status, 200, "reveal failed: {body}");

    let graded = request(
        app,
        Method::POST,
        &format!("/api/review/sessions/{session_id}/response"),
        Some(serde_json::json!({ "cardId": card_id, "confidence": confidence })),
    )
    .await;
    let (status, _, body) = response_json(graded).await;
    assert_eq!(status, 200, "record response failed: {body}");
    body
}
