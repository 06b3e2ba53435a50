//! # Tiered Record Store
//!
//! Local directory in front of a remote [`Backing`].
//!
//! ## Invariants
//! - Reads are served from the local tier only; the remote tier is used to
//!   fill it on a miss, a bounded number of times ([`ReadRepair`])
//! - Writes land locally before `put` returns; the remote copy is
//!   best-effort and never reported back to the caller
//! - No locking: concurrent merges of one record are last-write-wins

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::backing::Backing;
use super::errors::{RemoteError, StoreError, StoreResult};
use super::local::LocalStore;
use super::record::{is_valid_id, Record};
use crate::observability::Event;

/// How many times a local miss may be filled from the remote tier within
/// one `get`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRepair {
    pub max_fills: u32,
}

impl ReadRepair {
    /// Fill once, then give up
    pub const ONCE: ReadRepair = ReadRepair { max_fills: 1 };
    /// Never consult the remote tier on read
    pub const LOCAL_ONLY: ReadRepair = ReadRepair { max_fills: 0 };
}

impl Default for ReadRepair {
    fn default() -> Self {
        ReadRepair::ONCE
    }
}

/// Two-tier record store
#[derive(Debug, Clone)]
pub struct TieredStore {
    local: LocalStore,
    remote: Arc<dyn Backing>,
    repair: ReadRepair,
    mirror_timeout: Duration,
}

impl TieredStore {
    /// Create a store with the default [`ReadRepair::ONCE`] policy
    pub fn new(local: LocalStore, remote: Arc<dyn Backing>, mirror_timeout: Duration) -> Self {
        Self {
            local,
            remote,
            repair: ReadRepair::default(),
            mirror_timeout,
        }
    }

    pub fn with_read_repair(mut self, repair: ReadRepair) -> Self {
        self.repair = repair;
        self
    }

    /// Gets a record, filling the local tier from the remote one on a miss.
    ///
    /// # Errors
    ///
    /// - `NotFound` if neither tier has the record (or the id is malformed)
    /// - `RemoteUnavailable` if the local tier missed and the remote could
    ///   not be read
    /// - `Corrupt` if the local file or the fetched remote object is not a
    ///   JSON object; a bad remote object is never cached locally
    pub async fn get(&self, id: &str) -> StoreResult<Record> {
        if !is_valid_id(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let mut fills = 0;
        loop {
            if let Some(record) = self.local.read(id)? {
                return Ok(record);
            }
            if fills >= self.repair.max_fills {
                return Err(StoreError::NotFound(id.to_string()));
            }

            debug!(event = %Event::RecordCacheMiss, id, "local miss, fetching from remote");
            match self.remote.download(id).await {
                Ok(data) => {
                    let record: Record =
                        serde_json::from_slice(&data).map_err(|e| StoreError::Corrupt {
                            id: id.to_string(),
                            reason: format!("remote object: {}", e),
                        })?;
                    self.local.write(id, &record)?;
                    fills += 1;
                    info!(event = %Event::RecordFilled, id, bytes = data.len(), "record filled from remote");
                }
                Err(RemoteError::NotFound(_)) => {
                    return Err(StoreError::NotFound(id.to_string()));
                }
                Err(RemoteError::Unavailable(reason)) => {
                    warn!(event = %Event::RemoteUnavailable, id, %reason, "remote read failed");
                    return Err(StoreError::RemoteUnavailable {
                        id: id.to_string(),
                        reason,
                    });
                }
            }
        }
    }

    /// Writes a record locally, then mirrors it to the remote tier in the
    /// background.
    pub fn put(&self, id: &str, record: &Record) -> StoreResult<()> {
        if !is_valid_id(id) {
            return Err(StoreError::InvalidId(id.to_string()));
        }

        let data = self.local.write(id, record)?;
        self.mirror(id, data);
        Ok(())
    }

    /// Shallow-merges `partial` into the stored record and writes it back.
    ///
    /// Nested objects in `partial` replace the stored value wholesale.
    pub async fn merge(&self, id: &str, partial: Record) -> StoreResult<Record> {
        let mut current = self.get(id).await?;
        for (key, value) in partial {
            current.insert(key, value);
        }
        self.put(id, &current)?;
        Ok(current)
    }

    /// Linear scan of the local tier for the first record whose top-level
    /// `field` equals `value`. The remote tier is not consulted.
    pub fn scan_by_field(&self, field: &str, value: &Value) -> StoreResult<Record> {
        for id in self.local.ids()? {
            match self.local.read(&id) {
                Ok(Some(record)) if record.get(field) == Some(value) => return Ok(record),
                Ok(_) => {}
                Err(e) => {
                    debug!(event = %Event::RecordSkipped, id = %id, error = %e, "skipping record");
                }
            }
        }
        Err(StoreError::NotFound(format!("{}={}", field, value)))
    }

    fn mirror(&self, id: &str, data: Vec<u8>) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(event = %Event::MirrorFailed, id, "no async runtime, mirror skipped");
            return;
        };

        let remote = Arc::clone(&self.remote);
        let id = id.to_string();
        let timeout = self.mirror_timeout;
        handle.spawn(async move {
            match tokio::time::timeout(timeout, remote.upload(&id, data)).await {
                Ok(Ok(())) => debug!(event = %Event::MirrorComplete, id = %id, "record mirrored"),
                Ok(Err(e)) => {
                    warn!(event = %Event::MirrorFailed, id = %id, error = %e, "mirror failed")
                }
                Err(_) => warn!(
                    event = %Event::MirrorFailed,
                    id = %id,
                    timeout_secs = timeout.as_secs(),
                    "mirror timed out"
                ),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DirectoryBacking;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Remote that serves one fixed answer and counts downloads
    #[derive(Debug)]
    struct ScriptedRemote {
        answer: Result<Vec<u8>, RemoteError>,
        downloads: AtomicUsize,
    }

    #[async_trait]
    impl Backing for ScriptedRemote {
        async fn upload(&self, _id: &str, _data: Vec<u8>) -> Result<(), RemoteError> {
            Ok(())
        }

        async fn download(&self, _id: &str) -> Result<Vec<u8>, RemoteError> {
            self.downloads.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    fn scripted(answer: Result<Vec<u8>, RemoteError>) -> Arc<ScriptedRemote> {
        Arc::new(ScriptedRemote {
            answer,
            downloads: AtomicUsize::new(0),
        })
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_unreadable_fill_does_not_loop() {
        let temp = TempDir::new().unwrap();
        let remote = scripted(Ok(b"not json".to_vec()));
        let store = TieredStore::new(
            LocalStore::new(temp.path().to_path_buf()),
            remote.clone(),
            Duration::from_secs(1),
        );

        assert!(matches!(store.get("c1").await, Err(StoreError::Corrupt { .. })));
        assert_eq!(remote.downloads.load(Ordering::SeqCst), 1);
        assert!(!store.local.exists("c1"));
        assert!(std::fs::read_dir(temp.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_truncated_remote_object_is_retried() {
        let temp = TempDir::new().unwrap();
        let remote_dir = temp.path().join("remote");
        let store = TieredStore::new(
            LocalStore::new(temp.path().join("local")),
            Arc::new(DirectoryBacking::new(remote_dir.clone(), "cards")),
            Duration::from_secs(1),
        );
        std::fs::create_dir_all(remote_dir.join("cards")).unwrap();
        let object = remote_dir.join("cards/c1.json");

        std::fs::write(&object, b"{ \"card_id\": \"c1\", \"bal").unwrap();
        assert!(matches!(store.get("c1").await, Err(StoreError::Corrupt { .. })));

        std::fs::write(&object, br#"{ "card_id": "c1", "balance": 100 }"#).unwrap();
        let card = store.get("c1").await.unwrap();
        assert_eq!(card["balance"], json!(100));
    }

    #[tokio::test]
    async fn test_local_only_policy_skips_remote() {
        let temp = TempDir::new().unwrap();
        let remote = scripted(Ok(b"{}".to_vec()));
        let store = TieredStore::new(
            LocalStore::new(temp.path().to_path_buf()),
            remote.clone(),
            Duration::from_secs(1),
        )
        .with_read_repair(ReadRepair::LOCAL_ONLY);

        assert!(matches!(store.get("c1").await, Err(StoreError::NotFound(_))));
        assert_eq!(remote.downloads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remote_unavailable_is_distinct() {
        let temp = TempDir::new().unwrap();
        let remote = scripted(Err(RemoteError::Unavailable("connection refused".into())));
        let store = TieredStore::new(
            LocalStore::new(temp.path().to_path_buf()),
            remote,
            Duration::from_secs(1),
        );

        assert!(matches!(
            store.get("c1").await,
            Err(StoreError::RemoteUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_id() {
        let temp = TempDir::new().unwrap();
        let remote = scripted(Ok(b"{}".to_vec()));
        let store = TieredStore::new(
            LocalStore::new(temp.path().to_path_buf()),
            remote.clone(),
            Duration::from_secs(1),
        );

        assert!(matches!(store.get("../x").await, Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.put("../x", &Record::new()),
            Err(StoreError::InvalidId(_))
        ));
        assert_eq!(remote.downloads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scan_skips_corrupt_records() {
        let temp = TempDir::new().unwrap();
        let local = LocalStore::new(temp.path().join("local"));
        let store = TieredStore::new(
            local.clone(),
            Arc::new(DirectoryBacking::new(temp.path().join("remote"), "cards")),
            Duration::from_secs(1),
        );

        local.write_bytes("aaa", b"{ broken").unwrap();
        store
            .put("bbb", &record(json!({ "card_token": 4242 })))
            .unwrap();

        let found = store.scan_by_field("card_token", &json!(4242)).unwrap();
        assert_eq!(found["card_token"], json!(4242));
        assert!(store.scan_by_field("card_token", &json!(1)).is_err());
    }
}
