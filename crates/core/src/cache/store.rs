//! Expiring key/value store.
//!
//! Each value is persisted as a [`CacheRecord`] stamped with the store's
//! clock. A record is valid while `now - stored_at < CACHE_TTL`. Expired
//! records are deleted lazily by [`ExpiringStore::get`]; [`ExpiringStore::peek`]
//! returns them untouched so callers can still fall back to old data.
//!
//! Storage failures never escape this type: reads degrade to a miss and
//! writes are logged and dropped.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use super::connection::CacheDb;
use super::key::CacheKey;
use crate::Error;

/// Validity window for every record.
pub const CACHE_TTL: TimeDelta = TimeDelta::hours(24);

/// Persisted envelope around a cached value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord<T> {
    pub data: T,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub stored_at: DateTime<Utc>,
}

impl<T> CacheRecord<T> {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now - self.stored_at < CACHE_TTL
    }
}

/// Durable store of expiring records, shared process-wide.
#[derive(Debug, Clone)]
pub struct ExpiringStore {
    db: CacheDb,
    clock: Arc<dyn Clock>,
}

impl ExpiringStore {
    pub fn new(db: CacheDb) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: CacheDb, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn is_valid<T>(&self, record: &CacheRecord<T>) -> bool {
        record.is_valid_at(self.clock.now())
    }

    /// Return the value under `key` if a well-formed, valid record exists.
    ///
    /// An expired record is deleted as a side effect.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let record = self.peek::<T>(key).await?;
        if self.is_valid(&record) {
            return Some(record.data);
        }

        tracing::debug!(key = %key, stored_at = %record.stored_at, "cache record expired");
        let stored_at_ms = record.stored_at.timestamp_millis();
        if let Err(e) = self.db.delete_record_stored_before(key.as_str(), stored_at_ms).await {
            tracing::warn!(key = %key, error = %e, "failed to delete expired cache record");
        }
        None
    }

    /// Return the record under `key` regardless of age, without deleting it.
    ///
    /// Missing, unreadable and malformed records all read as `None`.
    pub async fn peek<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<CacheRecord<T>> {
        let json = match self.db.get_record(key.as_str()).await {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "malformed cache record, treating as miss");
                None
            }
        }
    }

    /// Persist `value` under `key`, replacing any previous record.
    ///
    /// Failures are logged and swallowed.
    pub async fn set<T: Serialize>(&self, key: &CacheKey, value: &T) {
        if let Err(e) = self.try_set(key, value).await {
            tracing::warn!(key = %key, error = %e, "failed to persist cache record");
        }
    }

    async fn try_set<T: Serialize>(&self, key: &CacheKey, value: &T) -> Result<(), Error> {
        let stored_at = self.clock.now();
        let json = serde_json::to_string(&CacheRecord { data: value, stored_at })?;
        self.db.put_record(key.as_str(), &json, stored_at.timestamp_millis()).await?;
        tracing::debug!(key = %key, bytes = json.len(), "cache record stored");
        Ok(())
    }

    pub async fn remove(&self, key: &CacheKey) -> Result<bool, Error> {
        self.db.delete_record(key.as_str()).await
    }

    /// Delete every record that is no longer valid.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_expired(&self) -> Result<u64, Error> {
        let cutoff = self.clock.now() - CACHE_TTL;
        self.db.purge_records_before(cutoff.timestamp_millis()).await
    }

    pub async fn clear(&self) -> Result<u64, Error> {
        self.db.clear_records().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use std::collections::HashMap;

    async fn store_with_clock() -> (ExpiringStore, ManualClock) {
        let db = CacheDb::open_in_memory().await.unwrap();
        let clock = ManualClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        (ExpiringStore::with_clock(db, Arc::new(clock.clone())), clock)
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let (store, _clock) = store_with_clock().await;
        let key = CacheKey::breed_list();

        store.set(&key, &vec!["akita".to_string()]).await;

        let got: Option<Vec<String>> = store.get(&key).await;
        assert_eq!(got, Some(vec!["akita".to_string()]));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (store, _clock) = store_with_clock().await;
        let got: Option<Vec<String>> = store.get(&CacheKey::breed_list()).await;
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_expiry_boundary_deletes_record() {
        let (store, clock) = store_with_clock().await;
        let key = CacheKey::breed_images("akita");
        store.set(&key, &vec!["a.jpg".to_string()]).await;

        clock.advance(TimeDelta::hours(24) - TimeDelta::milliseconds(1));
        assert!(store.get::<Vec<String>>(&key).await.is_some());

        clock.advance(TimeDelta::milliseconds(1));
        assert!(store.get::<Vec<String>>(&key).await.is_none());
        assert!(store.db().get_record(key.as_str()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_peek_keeps_expired_record() {
        let (store, clock) = store_with_clock().await;
        let key = CacheKey::breed_list();
        store.set(&key, &vec!["pug".to_string()]).await;
        let stamped = clock.now();

        clock.advance(TimeDelta::hours(30));

        let record: CacheRecord<Vec<String>> = store.peek(&key).await.unwrap();
        assert_eq!(record.data, vec!["pug".to_string()]);
        assert_eq!(record.stored_at, stamped);
        assert!(!store.is_valid(&record));
        assert!(store.db().get_record(key.as_str()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_malformed_record_reads_as_absent() {
        let (store, _clock) = store_with_clock().await;
        let key = CacheKey::breed_list();

        store.db().put_record(key.as_str(), "{not json", 0).await.unwrap();
        assert!(store.get::<Vec<String>>(&key).await.is_none());

        store
            .db()
            .put_record(key.as_str(), r#"{"data":42,"timestamp":0}"#, 0)
            .await
            .unwrap();
        assert!(store.peek::<Vec<String>>(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_set_failure_is_non_fatal() {
        let (store, _clock) = store_with_clock().await;
        let key = CacheKey::new("unserializable");

        // serde_json rejects non-string map keys.
        let value: HashMap<(u8, u8), u8> = HashMap::from([((1, 2), 3)]);
        store.set(&key, &value).await;

        assert!(store.get::<serde_json::Value>(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites_and_restamps() {
        let (store, clock) = store_with_clock().await;
        let key = CacheKey::breed_list();

        store.set(&key, &vec!["a".to_string()]).await;
        clock.advance(TimeDelta::hours(23));
        store.set(&key, &vec!["b".to_string()]).await;
        clock.advance(TimeDelta::hours(23));

        let got: Option<Vec<String>> = store.get(&key).await;
        assert_eq!(got, Some(vec!["b".to_string()]));
    }

    #[tokio::test]
    async fn test_record_wire_format() {
        let (store, clock) = store_with_clock().await;
        let key = CacheKey::breed_list();
        store.set(&key, &vec!["akita".to_string()]).await;

        let json = store.db().get_record(key.as_str()).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["data"], serde_json::json!(["akita"]));
        assert_eq!(value["timestamp"], serde_json::json!(clock.now().timestamp_millis()));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (store, clock) = store_with_clock().await;
        store.set(&CacheKey::new("old"), &1).await;
        clock.advance(TimeDelta::hours(20));
        store.set(&CacheKey::new("young"), &2).await;
        clock.advance(TimeDelta::hours(5));

        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert!(store.peek::<i32>(&CacheKey::new("old")).await.is_none());
        assert_eq!(store.get::<i32>(&CacheKey::new("young")).await, Some(2));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let (store, _clock) = store_with_clock().await;
        store.set(&CacheKey::new("a"), &1).await;
        store.set(&CacheKey::new("b"), &2).await;

        assert!(store.remove(&CacheKey::new("a")).await.unwrap());
        assert_eq!(store.clear().await.unwrap(), 1);
    }
}
