use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Email subscriber. `email` is the unique key; re-subscribing an inactive
/// address reactivates the existing row instead of inserting a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub email: String,
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
}
