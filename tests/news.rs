
use chrono::{DateTime, Utc};
use reqwest::{
    multipart::{Form, Part},
    StatusCode,
};
use serde_json::{json, Value};
use test_utils::*;

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn new_article(title: &str) -> Value {
    json!({
        "title": title,
        "details": "The quarterly town hall will cover the budget and road works.",
        "event": "Town Hall",
        "location": "Civic Centre, Ward 2",
    })
}

fn published_at(body: &Value) -> DateTime<Utc> {
    body["data"]["published_at"].as_str().unwrap().parse().unwrap()
}

#[actix_rt::test]
async fn create_read_update_round_trip() {
    let app = TestApp::spawn().await;

    let response = app.admin_post("/news").json(&new_article("Town hall meeting announced")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "News created successfully");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app.client.get(app.api(&format!("/news/{}", id))).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Town hall meeting announced");
    assert_eq!(body["data"]["details"], "The quarterly town hall will cover the budget and road works.");
    assert_eq!(body["data"]["event"], "Town Hall");
    assert_eq!(body["data"]["location"], "Civic Centre, Ward 2");
    assert_eq!(body["data"]["images"], json!([]));

    let response = app
        .admin_put(&format!("/news/{}", id))
        .json(&json!({ "event": "Budget Hearing" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["event"], "Budget Hearing");
    assert_eq!(body["data"]["title"], "Town hall meeting announced");
}

#[actix_rt::test]
async fn published_at_defaults_to_creation_time() {
    let app = TestApp::spawn().await;
    let before = Utc::now();

    let body: Value = app
        .admin_post("/news")
        .json(&new_article("Library opening hours extended"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let published = published_at(&body);
    assert!(published >= before && published <= Utc::now());
}

#[actix_rt::test]
async fn explicit_published_at_is_kept() {
    let app = TestApp::spawn().await;

    let mut article = new_article("Spring clean-up volunteers wanted");
    article["published_at"] = json!("2024-03-01T10:00:00Z");

    let body: Value = app.admin_post("/news").json(&article).send().await.unwrap().json().await.unwrap();

    assert_eq!(published_at(&body), "2024-03-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap());
}

#[actix_rt::test]
async fn script_only_details_are_rejected() {
    let app = TestApp::spawn().await;

    let mut article = new_article("Water main repairs scheduled");
    article["details"] = json!("<script>alert('town hall meeting')</script>");

    let response = app.admin_post("/news").json(&article).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["errors"].as_array().unwrap().iter().any(|e| e["field"] == "details"));
    assert!(app.store.news.lock().is_empty());
}

#[actix_rt::test]
async fn delete_then_read_is_not_found() {
    let app = TestApp::spawn().await;

    let body: Value = app
        .admin_post("/news")
        .json(&new_article("Farmers market returns Saturday"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app.admin_delete(&format!("/news/{}", id)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.client.get(app.api(&format!("/news/{}", id))).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "News article not found");
}

#[actix_rt::test]
async fn list_is_newest_first_with_total() {
    let app = TestApp::spawn().await;

    for title in ["First community notice", "Second community notice"] {
        app.admin_post("/news").json(&new_article(title)).send().await.unwrap();
    }

    let body: Value = app.client.get(app.api("/news?limit=1")).send().await.unwrap().json().await.unwrap();

    assert_eq!(body["count"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Second community notice");
}

#[actix_rt::test]
async fn images_upload_under_news_prefix() {
    let app = TestApp::spawn().await;

    let part = Part::bytes(PNG_MAGIC.to_vec())
        .file_name("Town Hall.png")
        .mime_str("image/png")
        .unwrap();
    let form = Form::new().part("images", part);

    let response = app.admin_post("/news/upload").multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let url = body["data"]["urls"][0].as_str().unwrap();
    assert!(url.starts_with("https://storage.test/public/news/"));

    let objects = app.storage.objects.lock();
    assert_eq!(objects.len(), 1);
    assert!(objects[0].0.starts_with("news/"));
    assert!(objects[0].0.ends_with("-town-hall.png"));
}

#[actix_rt::test]
async fn news_upload_requires_admin_key() {
    let app = TestApp::spawn().await;

    let part = Part::bytes(PNG_MAGIC.to_vec()).file_name("a.png").mime_str("image/png").unwrap();
    let response = app
        .client
        .post(app.api("/news/upload"))
        .header("x-api-key", PUBLIC_KEY)
        .multipart(Form::new().part("images", part))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.storage.objects.lock().is_empty());
}
