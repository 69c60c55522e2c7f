//! Raw record CRUD operations.
//!
//! Stores serialized `CacheRecord` JSON by key. Validity rules live in
//! [`super::store::ExpiringStore`]; this layer only moves strings in and out.

use super::connection::CacheDb;
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

impl CacheDb {
    /// Get the serialized record stored under `key`.
    ///
    /// Returns None if the key doesn't exist in the cache.
    pub async fn get_record(&self, key: &str) -> Result<Option<String>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let mut stmt = conn.prepare("SELECT record_json FROM records WHERE key = ?1")?;

                match stmt.query_row(params![key], |row| row.get(0)) {
                    Ok(json) => Ok(Some(json)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace the record stored under `key`.
    ///
    /// `stored_at_ms` mirrors the timestamp inside `record_json` so expired
    /// rows can be purged without decoding them.
    pub async fn put_record(&self, key: &str, record_json: &str, stored_at_ms: i64) -> Result<(), Error> {
        let key = key.to_string();
        let record_json = record_json.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO records (key, record_json, stored_at)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(key) DO UPDATE SET
                        record_json = excluded.record_json,
                        stored_at = excluded.stored_at",
                    params![key, record_json, stored_at_ms],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete the record stored under `key`.
    ///
    /// Returns true if a row was removed.
    pub async fn delete_record(&self, key: &str) -> Result<bool, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM records WHERE key = ?1", params![key])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete the record under `key` only if it was stored at or before `stored_at_ms`.
    ///
    /// A record rewritten since it was read is left alone.
    pub async fn delete_record_stored_before(&self, key: &str, stored_at_ms: i64) -> Result<bool, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM records WHERE key = ?1 AND stored_at <= ?2",
                    params![key, stored_at_ms],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete records stored at or before `cutoff_ms`.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_records_before(&self, cutoff_ms: i64) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM records WHERE stored_at <= ?1", params![cutoff_ms])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every record.
    ///
    /// Returns the number of deleted entries.
    pub async fn clear_records(&self) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM records", [])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get_record() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_record("k", r#"{"data":1,"timestamp":5}"#, 5).await.unwrap();

        let json = db.get_record("k").await.unwrap().unwrap();
        assert_eq!(json, r#"{"data":1,"timestamp":5}"#);
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.get_record("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_record("k", "old", 1).await.unwrap();
        db.put_record("k", "new", 2).await.unwrap();

        assert_eq!(db.get_record("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_delete_record() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_record("k", "v", 1).await.unwrap();

        assert!(db.delete_record("k").await.unwrap());
        assert!(!db.delete_record("k").await.unwrap());
        assert!(db.get_record("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_records_before() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_record("old", "v", 100).await.unwrap();
        db.put_record("edge", "v", 200).await.unwrap();
        db.put_record("new", "v", 300).await.unwrap();

        let deleted = db.purge_records_before(200).await.unwrap();
        assert_eq!(deleted, 2);
        assert!(db.get_record("old").await.unwrap().is_none());
        assert!(db.get_record("new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clear_records() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_record("a", "v", 1).await.unwrap();
        db.put_record("b", "v", 1).await.unwrap();

        assert_eq!(db.clear_records().await.unwrap(), 2);
        assert!(db.get_record("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_conditional_delete_keeps_rewritten_record() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_record("dog-breeds-list", r#"{"data":[],"timestamp":1000}"#, 1000).await.unwrap();

        // Rewritten after the expired copy was read at 500.
        assert!(!db.delete_record_stored_before("dog-breeds-list", 500).await.unwrap());
        assert!(db.get_record("dog-breeds-list").await.unwrap().is_some());

        assert!(db.delete_record_stored_before("dog-breeds-list", 1000).await.unwrap());
        assert!(db.get_record("dog-breeds-list").await.unwrap().is_none());
    }
}
