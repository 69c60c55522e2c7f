//! Core types and shared functionality for kennel.
//!
//! This crate provides:
//! - Expiring key/value store with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CACHE_TTL, CacheDb, CacheKey, CacheRecord, Clock, ExpiringStore, ManualClock, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use error::{Error, ErrorKind};
