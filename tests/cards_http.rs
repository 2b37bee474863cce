mod common;

use axum::http::{Method, StatusCode};

use common::app::spawn_test_app;
use common::fixtures::{create_card, create_collection};
use common::http::{assert_json_error, assert_status_ok_json, request, response_json};

#[tokio::test]
async fn it_card_create_and_list() {
    let app = spawn_test_app().await;
    let col = create_collection(&app.app, "words").await;

    let resp = request(
        &app.app,
        Method::POST,
        &format!("/api/collections/{col}/cards"),
        Some(serde_json::json!({
            "front": "turquoise",
            "back": "فیروزه‌ای",
            "cardType": "word",
            "partOfSpeech": "adjective",
            "synonyms": ["teal"]
        })),
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["front"], "turquoise");
    assert_eq!(body["data"]["learningStatus"], "new");
    assert_eq!(body["data"]["reviewedNumber"], 0);
    assert_eq!(body["data"]["reviewStats"]["totalReviews"], 0);
    assert_eq!(body["data"]["spacedRepetition"]["repetitions"], 0);

    let list = request(
        &app.app,
        Method::GET,
        &format!("/api/collections/{col}/cards"),
        None,
    )
    .await;
    let (status, _, body) = response_json(list).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    // Creating a card bumps the collection's card count.
    let col_resp = request(
        &app.app,
        Method::GET,
        &format!("/api/collections/{col}"),
        None,
    )
    .await;
    let (_, _, col_body) = response_json(col_resp).await;
    assert_eq!(col_body["data"]["cardCount"], 1);
}

#[tokio::test]
async fn it_card_blank_front_is_rejected() {
    let app = spawn_test_app().await;
    let col = create_collection(&app.app, "words").await;

    let resp = request(
        &app.app,
        Method::POST,
        &format!("/api/collections/{col}/cards"),
        Some(serde_json::json!({ "front": " ", "back": "چیزی" })),
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "CARD_INVALID_TEXT");
}

#[tokio::test]
async fn it_card_create_in_missing_collection_is_404() {
    let app = spawn_test_app().await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/collections/none/cards",
        Some(serde_json::json!({ "front": "a", "back": "b" })),
    )
    .await;
    let (status, _, _) = response_json(resp).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn it_card_content_update_keeps_review_state() {
    let app = spawn_test_app().await;
    let col = create_collection(&app.app, "words").await;
    let card = create_card(&app.app, &col, "cat", "گربه").await;

    let update = request(
        &app.app,
        Method::PUT,
        &format!("/api/collections/{col}/cards/{card}"),
        Some(serde_json::json!({
            "definition": "a small domesticated felid",
            "front": "cat "
        })),
    )
    .await;
    let (status, _, body) = response_json(update).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["front"], "cat");
    assert_eq!(body["data"]["definition"], "a small domesticated felid");
    // Review state untouched by content edits.
    assert_eq!(body["data"]["reviewedNumber"], 0);
    assert_eq!(body["data"]["reviewStats"]["totalReviews"], 0);
}

#[tokio::test]
async fn it_card_delete_updates_count() {
    let app = spawn_test_app().await;
    let col = create_collection(&app.app, "words").await;
    let card = create_card(&app.app, &col, "cat", "گربه").await;

    let del = request(
        &app.app,
        Method::DELETE,
        &format!("/api/collections/{col}/cards/{card}"),
        None,
    )
    .await;
    let (status, _, _) = response_json(del).await;
    assert_eq!(status, StatusCode::OK);

    let missing = request(
        &app.app,
        Method::GET,
        &format!("/api/collections/{col}/cards/{card}"),
        None,
    )
    .await;
    let (status, _, _) = response_json(missing).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let col_resp = request(
        &app.app,
        Method::GET,
        &format!("/api/collections/{col}"),
        None,
    )
    .await;
    let (_, _, col_body) = response_json(col_resp).await;
    assert_eq!(col_body["data"]["cardCount"], 0);
}

#[tokio::test]
async fn it_new_cards_are_due_immediately() {
    let app = spawn_test_app().await;
    let col = create_collection(&app.app, "words").await;
    create_card(&app.app, &col, "cat", "گربه").await;
    create_card(&app.app, &col, "dog", "سگ").await;

    let due = request(
        &app.app,
        Method::GET,
        &format!("/api/collections/{col}/cards/due?limit=10"),
        None,
    )
    .await;
    let (status, _, body) = response_json(due).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn it_card_search_matches_substrings() {
    let app = spawn_test_app().await;
    let col = create_collection(&app.app, "words").await;
    create_card(&app.app, &col, "take off", "بلند شدن").await;
    create_card(&app.app, &col, "apple", "سیب").await;

    let found = request(
        &app.app,
        Method::GET,
        &format!("/api/collections/{col}/cards?search=take"),
        None,
    )
    .await;
    let (status, _, body) = response_json(found).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["front"], "take off");
}
