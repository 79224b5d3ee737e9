//! Listing and image streaming integration tests.
//!
//! Run with: `cargo test -p photofeed-api --test gallery_test`

mod helpers;

use axum::http::StatusCode;
use helpers::{seed_image, setup_test_app};
use photofeed_core::models::ImagePage;
use photofeed_storage::BlobStore;

#[tokio::test]
async fn pagination_over_25_records() {
    let app = setup_test_app();
    for i in 0..25 {
        seed_image(&app.store, &format!("{:032x}.jpg", i), b"img", 0).await;
    }

    let page: ImagePage = app.server.get("/").add_query_param("page", 1).await.json();
    assert_eq!(page.entries.len(), 10);
    assert_eq!(page.total_pages, 3);

    let page: ImagePage = app.server.get("/").add_query_param("page", 3).await.json();
    assert_eq!(page.entries.len(), 5);

    let page: ImagePage = app.server.get("/").add_query_param("page", 4).await.json();
    assert_eq!(page.entries.len(), 0);
    assert_eq!(page.total_pages, 3);
}

#[tokio::test]
async fn listing_is_reverse_chronological() {
    let app = setup_test_app();
    seed_image(&app.store, "oldest.jpg", b"1", 0).await;
    seed_image(&app.store, "middle.jpg", b"2", 0).await;
    seed_image(&app.store, "newest.jpg", b"3", 0).await;

    let page: ImagePage = app.server.get("/").await.json();
    let keys: Vec<&str> = page
        .entries
        .iter()
        .map(|e| e.storage_key.as_str())
        .collect();
    assert_eq!(keys, vec!["newest.jpg", "middle.jpg", "oldest.jpg"]);
}

#[tokio::test]
async fn non_numeric_page_falls_back_to_first() {
    let app = setup_test_app();
    seed_image(&app.store, "a.jpg", b"1", 0).await;

    let response = app.server.get("/").add_query_param("page", "not-a-number").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let page: ImagePage = response.json();
    assert_eq!(page.page, 1);
    assert_eq!(page.entries.len(), 1);
}

#[tokio::test]
async fn stored_image_streams_back_with_content_type() {
    let app = setup_test_app();
    let payload = vec![42u8; 2048];
    seed_image(&app.store, "pic.jpg", &payload, 1).await;
    let id = app.store.list_all().await.expect("list")[0].id;

    let response = app.server.get(&format!("/images/{}", id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/jpeg"
    );
    assert_eq!(response.as_bytes().as_ref(), payload.as_slice());
}

#[tokio::test]
async fn unknown_image_id_is_404() {
    let app = setup_test_app();
    let response = app
        .server
        .get("/images/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_image_id_is_404() {
    let app = setup_test_app();
    let response = app.server.get("/images/not-a-uuid").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_form_renders() {
    let app = setup_test_app();
    let response = app.server.get("/upload").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("multipart/form-data"));
}
