//! linkedin-connector adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `content_hub`: Content hub REST source
//! - `linkedin`: LinkedIn assets and UGC post publisher
//! - `delivery`: SQLite and in-memory delivery logs
//! - `stub`: Offline content source and publisher

mod delivery_memory;
mod delivery_sqlite;

pub mod content_hub;
pub mod linkedin;
pub mod stub;

/// Re-exports for delivery log adapters
pub mod delivery {
    pub use crate::delivery_memory::InMemoryDeliveryLog;
    pub use crate::delivery_sqlite::SqliteDeliveryLog;
}
