use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Form,
};
use photofeed_core::AppError;
use serde::Deserialize;

use crate::error::HttpAppError;
use crate::state::AppState;

const SUBSCRIBE_FORM: &str = r#"<!doctype html>
<html>
  <body>
    <h1>Subscribe to new photos</h1>
    <form action="/subscribe" method="post">
      <input type="email" name="email" placeholder="you@example.com" />
      <button type="submit">Subscribe</button>
    </form>
  </body>
</html>
"#;

/// `GET /subscribe` — the subscription form.
pub async fn subscribe_form() -> Html<&'static str> {
    Html(SUBSCRIBE_FORM)
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    email: Option<String>,
}

/// `POST /subscribe` — create or reactivate a subscriber.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SubscribeRequest>,
) -> Result<Response, HttpAppError> {
    let email = form
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Email is required.".to_string()))?;

    let subscriber = state.subscribers.subscribe(&email).await?;
    tracing::info!(email = %subscriber.email, "Subscriber active");

    Ok("Subscribed successfully.".into_response())
}
