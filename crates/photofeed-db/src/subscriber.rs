//! Subscriber repository: insert-or-reactivate and active-list queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use photofeed_core::models::Subscriber;
use photofeed_core::AppError;
use sqlx::PgPool;

/// Row type for the subscribers table.
#[derive(Debug, sqlx::FromRow)]
struct SubscriberRow {
    email: String,
    is_active: bool,
    subscribed_at: DateTime<Utc>,
}

impl SubscriberRow {
    fn to_subscriber(self) -> Subscriber {
        Subscriber {
            email: self.email,
            is_active: self.is_active,
            subscribed_at: self.subscribed_at,
        }
    }
}

/// Subscriber registry operations.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Create the subscriber, or reactivate it if it exists inactive.
    /// Subscribing an already-active address is a no-op returning the
    /// existing row.
    async fn subscribe(&self, email: &str) -> Result<Subscriber, AppError>;

    /// All subscribers with `is_active == true`.
    async fn list_active(&self) -> Result<Vec<Subscriber>, AppError>;
}

#[derive(Clone)]
pub struct PgSubscriberStore {
    pool: PgPool,
}

impl PgSubscriberStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriberStore for PgSubscriberStore {
    #[tracing::instrument(skip(self), fields(db.table = "subscribers"))]
    async fn subscribe(&self, email: &str) -> Result<Subscriber, AppError> {
        // Reactivation refreshes subscribed_at; an already-active row is
        // returned untouched. The upsert keeps concurrent subscribes of the
        // same address from racing.
        let row: SubscriberRow = sqlx::query_as(
            r#"
            INSERT INTO subscribers (email, is_active, subscribed_at)
            VALUES ($1, TRUE, NOW())
            ON CONFLICT (email) DO UPDATE
            SET is_active = TRUE,
                subscribed_at = CASE
                    WHEN subscribers.is_active THEN subscribers.subscribed_at
                    ELSE NOW()
                END
            RETURNING email, is_active, subscribed_at
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.to_subscriber())
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscribers"))]
    async fn list_active(&self) -> Result<Vec<Subscriber>, AppError> {
        let rows: Vec<SubscriberRow> = sqlx::query_as(
            "SELECT email, is_active, subscribed_at FROM subscribers WHERE is_active = TRUE",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SubscriberRow::to_subscriber).collect())
    }
}
