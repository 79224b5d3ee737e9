//! In-memory subscriber registry for tests.

use crate::subscriber::SubscriberStore;
use async_trait::async_trait;
use chrono::Utc;
use photofeed_core::models::Subscriber;
use photofeed_core::AppError;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MemorySubscriberStore {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl MemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a subscriber in a given activation state.
    pub fn insert(&self, email: &str, is_active: bool) {
        let mut subs = self.subscribers.lock().expect("registry lock");
        subs.push(Subscriber {
            email: email.to_string(),
            is_active,
            subscribed_at: Utc::now(),
        });
    }

    pub fn all(&self) -> Vec<Subscriber> {
        self.subscribers.lock().expect("registry lock").clone()
    }
}

#[async_trait]
impl SubscriberStore for MemorySubscriberStore {
    async fn subscribe(&self, email: &str) -> Result<Subscriber, AppError> {
        let mut subs = self.subscribers.lock().expect("registry lock");
        if let Some(existing) = subs.iter_mut().find(|s| s.email == email) {
            if !existing.is_active {
                existing.is_active = true;
                existing.subscribed_at = Utc::now();
            }
            return Ok(existing.clone());
        }
        let subscriber = Subscriber {
            email: email.to_string(),
            is_active: true,
            subscribed_at: Utc::now(),
        };
        subs.push(subscriber.clone());
        Ok(subscriber)
    }

    async fn list_active(&self) -> Result<Vec<Subscriber>, AppError> {
        let subs = self.subscribers.lock().expect("registry lock");
        Ok(subs.iter().filter(|s| s.is_active).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn double_subscribe_keeps_one_active_row() {
        let store = MemorySubscriberStore::new();
        store.subscribe("a@example.com").await.expect("subscribe");
        store.subscribe("a@example.com").await.expect("subscribe");

        let all = store.all();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_active);
    }

    #[tokio::test]
    async fn resubscribe_reactivates_and_refreshes_timestamp() {
        let store = MemorySubscriberStore::new();
        store.insert("b@example.com", false);
        let before = store.all()[0].subscribed_at;

        let subscriber = store.subscribe("b@example.com").await.expect("subscribe");
        assert!(subscriber.is_active);
        assert!(subscriber.subscribed_at >= before);
        assert_eq!(store.all().len(), 1);
    }

    #[tokio::test]
    async fn list_active_excludes_inactive() {
        let store = MemorySubscriberStore::new();
        store.insert("active@example.com", true);
        store.insert("inactive@example.com", false);

        let active = store.list_active().await.expect("list");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].email, "active@example.com");
    }
}
