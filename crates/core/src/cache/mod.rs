//! SQLite-backed expiring key/value store.
//!
//! This module provides a durable cache of serialized values using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - `CacheRecord<T>` envelopes stamped with the store's clock at write time
//! - A fixed 24h validity window, enforced lazily on read
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod clock;
pub mod connection;
pub mod key;
pub mod migrations;
pub mod records;
pub mod store;

pub use crate::Error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use connection::CacheDb;
pub use key::CacheKey;
pub use store::{CACHE_TTL, CacheRecord, ExpiringStore};
