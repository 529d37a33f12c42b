
use reqwest::StatusCode;
use serde_json::Value;
use test_utils::*;

#[actix_rt::test]
async fn admin_route_without_key_is_unauthorized() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.api("/complaints")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn public_key_does_not_unlock_admin_routes() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.api("/subscribers"))
        .header("x-api-key", PUBLIC_KEY)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn admin_key_is_accepted_from_any_header() {
    let app = TestApp::spawn().await;

    let via_api_key = app.admin_get("/complaints").send().await.unwrap();
    assert_eq!(via_api_key.status(), StatusCode::OK);

    let via_bearer = app
        .client
        .get(app.api("/complaints"))
        .bearer_auth(ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(via_bearer.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn open_mode_lets_anonymous_callers_read() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.api("/news")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
