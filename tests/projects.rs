
use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;

fn new_project(title: &str, status: &str) -> Value {
    json!({
        "title": title,
        "description": "Complete resurfacing of the arterial road, including drainage.",
        "location": "Main Street, Ward 4",
        "district": "Central",
        "status": status,
    })
}

#[actix_rt::test]
async fn create_read_update_round_trip() {
    let app = TestApp::spawn().await;

    let response = app
        .admin_post("/projects")
        .json(&new_project("Main Street resurfacing", "in_progress"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app.client.get(app.api(&format!("/projects/{}", id))).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Main Street resurfacing");
    assert_eq!(body["data"]["status"], "in_progress");

    let response = app
        .admin_put(&format!("/projects/{}", id))
        .json(&json!({ "status": "completed", "district": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["district"], Value::Null);
    assert_eq!(body["data"]["location"], "Main Street, Ward 4");
}

#[actix_rt::test]
async fn short_title_is_rejected_with_field_error() {
    let app = TestApp::spawn().await;

    let response = app
        .admin_post("/projects")
        .json(&new_project("Road", "in_progress"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    let errors = body["errors"].as_array().unwrap();
    assert!(errors.iter().any(|e| e["field"] == "title"));
    assert!(app.store.projects.lock().is_empty());
}

#[actix_rt::test]
async fn status_filter_reports_filtered_total() {
    let app = TestApp::spawn().await;

    for (title, status) in [
        ("Library roof replacement", "completed"),
        ("Riverside park lighting", "in_progress"),
        ("Market square paving", "completed"),
    ] {
        let response = app.admin_post("/projects").json(&new_project(title, status)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .client
        .get(app.api("/projects?status=completed&limit=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Market square paving");
}

#[actix_rt::test]
async fn unknown_status_filter_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.api("/projects?status=paused")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn deleted_project_is_gone() {
    let app = TestApp::spawn().await;

    let body: Value = app
        .admin_post("/projects")
        .json(&new_project("Community centre refit", "in_progress"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app.admin_delete(&format!("/projects/{}", id)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.client.get(app.api(&format!("/projects/{}", id))).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Project not found");
}

#[actix_rt::test]
async fn malformed_id_is_bad_request() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.api("/projects/not-a-uuid")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
