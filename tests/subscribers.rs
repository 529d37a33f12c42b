
use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;

#[actix_rt::test]
async fn double_subscribe_is_rejected() {
    let app = TestApp::spawn().await;

    let first = app
        .client
        .post(app.api("/subscribers/subscribe"))
        .json(&json!({ "email": "reader@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .client
        .post(app.api("/subscribers/subscribe"))
        .json(&json!({ "email": "  Reader@Example.com " }))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["message"], "Email is already subscribed");
}

#[actix_rt::test]
async fn unsubscribe_then_resubscribe_keeps_one_row() {
    let app = TestApp::spawn().await;
    let email = json!({ "email": "reader@example.com" });

    app.client.post(app.api("/subscribers/subscribe")).json(&email).send().await.unwrap();

    let response = app.client.post(app.api("/subscribers/unsubscribe")).json(&email).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["subscribed"], false);

    let response = app.client.post(app.api("/subscribers/subscribe")).json(&email).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["subscribed"], true);

    let subscribers = app.store.subscribers.lock();
    assert_eq!(subscribers.len(), 1);
    assert!(subscribers[0].subscribed);
}

#[actix_rt::test]
async fn unknown_address_cannot_unsubscribe() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.api("/subscribers/unsubscribe"))
        .form(&[("email", "nobody@example.com")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn count_only_includes_active_subscribers() {
    let app = TestApp::spawn().await;
    app.seed_subscribers(&["a@example.com", "b@example.com", "c@example.com"]);

    app.client
        .post(app.api("/subscribers/unsubscribe"))
        .json(&json!({ "email": "b@example.com" }))
        .send()
        .await
        .unwrap();

    let body: Value = app.client.get(app.api("/subscribers/count")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["data"]["count"], 2);

    let body: Value = app
        .admin_get("/subscribers?subscribed=false")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["email"], "b@example.com");
}
