mod common;

use axum::http::{Method, StatusCode};

use common::app::spawn_test_app;
use common::fixtures::{create_card, create_collection};
use common::http::{assert_json_error, assert_status_ok_json, request, response_json};

#[tokio::test]
async fn it_collection_create_and_list() {
    let app = spawn_test_app().await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/collections",
        Some(serde_json::json!({
            "name": "Everyday idioms",
            "description": "Spoken English",
            "level": "intermediate"
        })),
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Everyday idioms");
    assert_eq!(body["data"]["level"], "intermediate");
    assert_eq!(body["data"]["cardCount"], 0);

    let list = request(&app.app, Method::GET, "/api/collections", None).await;
    let (status, _, body) = response_json(list).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn it_collection_blank_name_is_rejected() {
    let app = spawn_test_app().await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/collections",
        Some(serde_json::json!({ "name": "   " })),
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "COLLECTION_INVALID_NAME");
}

#[tokio::test]
async fn it_collection_update_and_get() {
    let app = spawn_test_app().await;
    let id = create_collection(&app.app, "draft").await;

    let update = request(
        &app.app,
        Method::PUT,
        &format!("/api/collections/{id}"),
        Some(serde_json::json!({ "name": "final", "level": "advanced" })),
    )
    .await;
    let (status, _, body) = response_json(update).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["name"], "final");

    let get = request(&app.app, Method::GET, &format!("/api/collections/{id}"), None).await;
    let (status, _, body) = response_json(get).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["name"], "final");
    assert_eq!(body["data"]["level"], "advanced");
}

#[tokio::test]
async fn it_collection_missing_returns_404() {
    let app = spawn_test_app().await;

    let resp = request(
        &app.app,
        Method::GET,
        "/api/collections/does-not-exist",
        None,
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_error(&body, "NOT_FOUND");
}

#[tokio::test]
async fn it_collection_delete_cascades_to_cards() {
    let app = spawn_test_app().await;
    let id = create_collection(&app.app, "doomed").await;
    create_card(&app.app, &id, "take off", "بلند شدن").await;

    let del = request(
        &app.app,
        Method::DELETE,
        &format!("/api/collections/{id}"),
        None,
    )
    .await;
    let (status, _, _) = response_json(del).await;
    assert_eq!(status, StatusCode::OK);

    // Cards are gone with their collection.
    let cards = request(
        &app.app,
        Method::GET,
        &format!("/api/collections/{id}/cards"),
        None,
    )
    .await;
    let (status, _, _) = response_json(cards).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Double delete is a 404.
    let again = request(
        &app.app,
        Method::DELETE,
        &format!("/api/collections/{id}"),
        None,
    )
    .await;
    let (status, _, _) = response_json(again).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
