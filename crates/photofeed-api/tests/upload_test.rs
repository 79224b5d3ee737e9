//! Upload pipeline integration tests.
//!
//! Run with: `cargo test -p photofeed-api --test upload_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::{setup_test_app, wait_for_mail, DetectorMode};
use photofeed_storage::BlobStore;

fn photo_form(bytes: Vec<u8>, description: Option<&str>) -> MultipartForm {
    let mut form = MultipartForm::new().add_part(
        "image",
        Part::bytes(bytes)
            .file_name("holiday.jpg")
            .mime_type("image/jpeg"),
    );
    if let Some(description) = description {
        form = form.add_text("description", description);
    }
    form
}

#[tokio::test]
async fn upload_commits_record_with_detection_metadata() {
    let app = setup_test_app();
    app.detector.set_mode(DetectorMode::People(2));

    let response = app
        .server
        .post("/upload")
        .multipart(photo_form(vec![1, 2, 3, 4], Some("two of us")))
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

    let all = app.store.list_all().await.expect("list");
    assert_eq!(all.len(), 1);
    let image = &all[0];
    assert_eq!(image.meta.people_detected, 2);
    assert_eq!(image.meta.detections.len(), 2);
    assert_eq!(image.meta.content_type, "image/jpeg");
    assert_eq!(image.meta.description.as_deref(), Some("two of us"));
    assert_eq!(image.length, 4);
}

#[tokio::test]
async fn storage_key_hides_original_filename() {
    let app = setup_test_app();

    app.server
        .post("/upload")
        .multipart(photo_form(vec![9; 16], None))
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let all = app.store.list_all().await.expect("list");
    let key = &all[0].storage_key;
    assert!(key.ends_with(".jpg"));
    assert_eq!(key.len(), 32 + ".jpg".len());
    assert!(!key.contains("holiday"));
    assert_eq!(all[0].meta.image_url, format!("/images/{}", key));
}

#[tokio::test]
async fn missing_file_is_rejected_with_400() {
    let app = setup_test_app();

    let response = app
        .server
        .post("/upload")
        .multipart(MultipartForm::new().add_text("description", "no image here"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.count().await.expect("count"), 0);
}

#[tokio::test]
async fn empty_file_is_rejected_with_400() {
    let app = setup_test_app();

    let response = app
        .server
        .post("/upload")
        .multipart(photo_form(Vec::new(), None))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.count().await.expect("count"), 0);
}

#[tokio::test]
async fn detection_failure_leaves_no_blob_and_sends_no_mail() {
    let app = setup_test_app();
    app.subscribers.insert("watcher@example.com", true);
    app.detector.set_mode(DetectorMode::Unreachable);

    let response = app
        .server
        .post("/upload")
        .multipart(photo_form(vec![1, 2, 3], None))
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(app.store.count().await.expect("count"), 0);
    assert!(app.mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn storage_failure_leaves_nothing_visible_and_sends_no_mail() {
    let app = setup_test_app();
    app.subscribers.insert("watcher@example.com", true);
    app.store.fail_commits(true);

    let response = app
        .server
        .post("/upload")
        .multipart(photo_form(vec![5; 64], None))
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(app.store.count().await.expect("count"), 0);
    assert!(app.mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn successful_upload_notifies_active_subscribers() {
    let app = setup_test_app();
    app.subscribers.insert("one@example.com", true);
    app.subscribers.insert("two@example.com", true);
    app.subscribers.insert("inactive@example.com", false);
    app.detector.set_mode(DetectorMode::People(3));

    app.server
        .post("/upload")
        .multipart(photo_form(vec![7; 8], Some("crowd")))
        .await
        .assert_status(StatusCode::SEE_OTHER);

    wait_for_mail(&app.mailer, 2).await;
    let sent = app.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    let image_id = app.store.list_all().await.expect("list")[0].id;
    for (_, body) in sent.iter() {
        assert!(body.contains("crowd"));
        assert!(body.contains("People detected:</strong> 3"));
        assert!(body.contains(&format!("/images/{}", image_id)));
    }
}

#[tokio::test]
async fn generic_error_message_hides_upstream_detail() {
    let app = setup_test_app();
    app.detector.set_mode(DetectorMode::Unreachable);

    let response = app
        .server
        .post("/upload")
        .multipart(photo_form(vec![1], None))
        .await;
    let body = response.text();
    assert!(body.contains("Error processing image"));
    assert!(!body.contains("connection refused"));
}
