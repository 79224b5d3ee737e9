//! Subscriber registry persistence.
//!
//! [`SubscriberStore`] is the seam the notifier and the subscribe handler
//! depend on; [`PgSubscriberStore`] is the production implementation and
//! [`MemorySubscriberStore`] backs the test suites.

pub mod memory;
pub mod subscriber;

pub use memory::MemorySubscriberStore;
pub use subscriber::{PgSubscriberStore, SubscriberStore};
