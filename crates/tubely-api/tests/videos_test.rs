mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::auth::bearer;
use helpers::{mp4_bytes, setup_test_app, setup_test_app_with, TestOptions, PUBLIC_BASE_URL};
use uuid::Uuid;

fn video_form(bytes: Vec<u8>, mime: &str) -> MultipartForm {
    let part = Part::bytes(bytes).file_name("clip.mp4").mime_type(mime);
    MultipartForm::new().add_part("video", part)
}

#[tokio::test]
async fn test_landscape_video_is_published() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video_id = app.create_video(owner).await;
    let bytes = mp4_bytes();

    let response = app
        .client()
        .post(&format!("/api/videos/{}/upload", video_id))
        .add_header("Authorization", bearer(owner))
        .multipart(video_form(bytes.clone(), "video/mp4"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let url = body["video_url"].as_str().expect("video_url missing").to_string();
    let prefix = format!("{}/media/landscape/", PUBLIC_BASE_URL);
    assert!(url.starts_with(&prefix), "unexpected url {}", url);
    assert!(url.ends_with(".mp4"));
    assert_eq!(app.video(video_id).await.video_url.as_deref(), Some(url.as_str()));

    let key = &url[format!("{}/media/", PUBLIC_BASE_URL).len()..];
    assert_eq!(std::fs::read(app.storage_root.join(key)).unwrap(), bytes);

    let served = app.client().get(&format!("/media/{}", key)).await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().as_ref(), bytes.as_slice());
}

#[tokio::test]
async fn test_portrait_video_is_published_under_portrait() {
    let app = setup_test_app_with(TestOptions {
        aspect_ratio: Some("9:16"),
        ..TestOptions::default()
    })
    .await;
    let owner = Uuid::new_v4();
    let video_id = app.create_video(owner).await;

    let response = app
        .client()
        .post(&format!("/api/videos/{}/upload", video_id))
        .add_header("Authorization", bearer(owner))
        .multipart(video_form(mp4_bytes(), "video/mp4"))
        .await;

    response.assert_status_ok();
    let url = app.video(video_id).await.video_url.expect("video_url not set");
    assert!(url.contains("/portrait/"), "unexpected url {}", url);
}

#[tokio::test]
async fn test_unrecognized_ratio_is_published_under_other() {
    let app = setup_test_app_with(TestOptions {
        aspect_ratio: Some("4:3"),
        ..TestOptions::default()
    })
    .await;
    let owner = Uuid::new_v4();
    let video_id = app.create_video(owner).await;

    let response = app
        .client()
        .post(&format!("/api/videos/{}/upload", video_id))
        .add_header("Authorization", bearer(owner))
        .multipart(video_form(mp4_bytes(), "video/mp4"))
        .await;

    response.assert_status_ok();
    let url = app.video(video_id).await.video_url.expect("video_url not set");
    assert!(url.contains("/other/"), "unexpected url {}", url);
}

#[tokio::test]
async fn test_image_on_video_route_is_rejected() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video_id = app.create_video(owner).await;

    let response = app
        .client()
        .post(&format!("/api/videos/{}/upload", video_id))
        .add_header("Authorization", bearer(owner))
        .multipart(video_form(mp4_bytes(), "image/png"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.video(video_id).await.video_url.is_none());
    assert!(!app.storage_root.join("landscape").exists());
}

#[tokio::test]
async fn test_thumbnail_field_on_video_route_is_missing_field() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video_id = app.create_video(owner).await;

    let part = Part::bytes(mp4_bytes()).file_name("clip.mp4").mime_type("video/mp4");
    let response = app
        .client()
        .post(&format!("/api/videos/{}/upload", video_id))
        .add_header("Authorization", bearer(owner))
        .multipart(MultipartForm::new().add_part("thumbnail", part))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_owner_cannot_publish_video() {
    let app = setup_test_app().await;
    let video_id = app.create_video(Uuid::new_v4()).await;

    let response = app
        .client()
        .post(&format!("/api/videos/{}/upload", video_id))
        .add_header("Authorization", bearer(Uuid::new_v4()))
        .multipart(video_form(mp4_bytes(), "video/mp4"))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert!(app.video(video_id).await.video_url.is_none());
}

#[tokio::test]
async fn test_missing_token_on_video_route() {
    let app = setup_test_app().await;
    let video_id = app.create_video(Uuid::new_v4()).await;

    app.client()
        .post(&format!("/api/videos/{}/upload", video_id))
        .multipart(video_form(mp4_bytes(), "video/mp4"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_oversized_video_is_rejected() {
    let app = setup_test_app_with(TestOptions {
        max_video_size_bytes: 32,
        ..TestOptions::default()
    })
    .await;
    let owner = Uuid::new_v4();
    let video_id = app.create_video(owner).await;

    let response = app
        .client()
        .post(&format!("/api/videos/{}/upload", video_id))
        .add_header("Authorization", bearer(owner))
        .multipart(video_form(mp4_bytes(), "video/mp4"))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.video(video_id).await.video_url.is_none());
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = setup_test_app().await;

    let health = app.client().get("/health").await;
    health.assert_status_ok();
    let body: serde_json::Value = health.json();
    assert_eq!(body["status"], "alive");

    let doc = app.client().get("/api/openapi.json").await;
    doc.assert_status_ok();
    let body: serde_json::Value = doc.json();
    assert!(body["paths"]["/api/videos/{video_id}/upload"].is_object());
}
