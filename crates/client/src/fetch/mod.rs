//! Cache-first fetch pipeline.
//!
//! ### Resolution order
//! 1. A valid record in the store is authoritative: serve it, skip the network.
//! 2. Offline: never attempt the network.
//! 3. Otherwise run the loader under a fixed timeout. On timeout the loader
//!    future is dropped, which aborts the in-flight request.
//! 4. Success is written back to the store and served fresh.
//! 5. Any failure falls back to whatever record is stored for the key, even
//!    an expired one, and serves it stale. With nothing stored the outcome is
//!    unavailable.
//!
//! Concurrent resolutions of the same key are not coalesced; the last write
//! to the store wins.

pub mod outcome;

use std::future::Future;
use std::time::Duration;

use kennel_core::{CacheKey, Error, ExpiringStore};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use outcome::{Advisory, FetchOutcome};

/// Orchestrates the store and a network loader. Owns no state of its own.
#[derive(Debug, Clone)]
pub struct FetchPipeline {
    store: ExpiringStore,
}

impl FetchPipeline {
    pub fn new(store: ExpiringStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ExpiringStore {
        &self.store
    }

    /// Resolve `key`, preferring the store and falling back to `loader`.
    ///
    /// Always produces a definite outcome; no error escapes.
    pub async fn resolve<T, F, Fut>(
        &self, key: &CacheKey, timeout: Duration, is_online: bool, loader: F,
    ) -> FetchOutcome<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        self.resolve_where(key, timeout, is_online, loader, |_| true).await
    }

    /// Like [`resolve`](Self::resolve), but values failing `usable` are never
    /// served from the store nor written to it.
    pub async fn resolve_where<T, F, Fut>(
        &self, key: &CacheKey, timeout: Duration, is_online: bool, loader: F, usable: impl Fn(&T) -> bool,
    ) -> FetchOutcome<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        tracing::debug!(key = %key, "checking cache");
        if let Some(record) = self.store.peek::<T>(key).await {
            if !usable(&record.data) {
                tracing::debug!(key = %key, "cached record unusable, treating as miss");
            } else if self.store.is_valid(&record) {
                tracing::info!(key = %key, "using cached data");
                return FetchOutcome::Fresh(record.data);
            } else {
                tracing::debug!(key = %key, stored_at = %record.stored_at, "cached record expired");
            }
        }

        if !is_online {
            let cause = Error::Offline(format!("no fresh data for {key}"));
            return self.fallback(key, cause, &usable).await;
        }

        tracing::debug!(key = %key, ?timeout, "network pending");
        let result = match tokio::time::timeout(timeout, loader()).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(timeout)),
        };

        match result {
            Ok(data) => {
                if usable(&data) {
                    self.store.set(key, &data).await;
                } else {
                    tracing::debug!(key = %key, "network result unusable, not caching");
                }
                tracing::debug!(key = %key, "serving fresh data from network");
                FetchOutcome::Fresh(data)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "network fetch failed");
                self.fallback(key, e, &usable).await
            }
        }
    }

    async fn fallback<T: DeserializeOwned>(
        &self, key: &CacheKey, cause: Error, usable: &impl Fn(&T) -> bool,
    ) -> FetchOutcome<T> {
        match self.store.peek::<T>(key).await {
            Some(record) if usable(&record.data) => {
                tracing::warn!(key = %key, stored_at = %record.stored_at, "serving stale data");
                FetchOutcome::Stale { data: record.data, cause }
            }
            _ => FetchOutcome::Unavailable(cause),
        }
    }
}
