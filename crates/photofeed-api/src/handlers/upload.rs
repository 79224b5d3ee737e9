use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use bytes::Bytes;
use photofeed_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

const UPLOAD_FORM: &str = r#"<!doctype html>
<html>
  <body>
    <h1>Upload a photo</h1>
    <form action="/upload" method="post" enctype="multipart/form-data">
      <input type="file" name="image" accept="image/*" />
      <input type="text" name="description" placeholder="Description" />
      <button type="submit">Upload</button>
    </form>
  </body>
</html>
"#;

/// `GET /upload` — the submission form.
pub async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

/// `POST /upload` — multipart fields `image` and `description`. On success
/// redirects to the gallery.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let mut file: Option<(Bytes, String, String)> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("image") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read image field: {}", e))
                })?;
                file = Some((bytes, filename, content_type));
            }
            Some("description") => {
                description = field.text().await.ok().filter(|s| !s.trim().is_empty());
            }
            _ => {}
        }
    }

    let (bytes, filename, content_type) =
        file.ok_or_else(|| AppError::InvalidInput("No file uploaded.".to_string()))?;

    state
        .uploads
        .handle_upload(bytes, &filename, &content_type, description)
        .await?;

    Ok(Redirect::to("/").into_response())
}
