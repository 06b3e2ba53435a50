//! # Remote Backing
//!
//! The durable tier behind the local record directory. Objects are keyed
//! `<prefix>/<id>.json`.

use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use super::errors::{RemoteError, RemoteResult};
use super::record::generate_id;

/// Default namespace for record objects
pub const DEFAULT_PREFIX: &str = "staging_cards";

/// Object key for a record id
pub fn object_key(prefix: &str, id: &str) -> String {
    if prefix.is_empty() {
        format!("{}.json", id)
    } else {
        format!("{}/{}.json", prefix.trim_end_matches('/'), id)
    }
}

/// Remote object store capability
#[async_trait]
pub trait Backing: Send + Sync + fmt::Debug {
    /// Store `data` as the object for `id`, replacing any previous version
    async fn upload(&self, id: &str, data: Vec<u8>) -> RemoteResult<()>;

    /// Fetch the object for `id`
    async fn download(&self, id: &str) -> RemoteResult<Vec<u8>>;
}

/// Backing that keeps objects in a directory, laid out like a bucket
#[derive(Debug, Clone)]
pub struct DirectoryBacking {
    root: PathBuf,
    prefix: String,
}

impl DirectoryBacking {
    pub fn new(root: PathBuf, prefix: impl Into<String>) -> Self {
        Self {
            root,
            prefix: prefix.into(),
        }
    }

    fn full_path(&self, id: &str) -> PathBuf {
        self.root.join(object_key(&self.prefix, id))
    }
}

#[async_trait]
impl Backing for DirectoryBacking {
    async fn upload(&self, id: &str, data: Vec<u8>) -> RemoteResult<()> {
        let path = self.full_path(id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        }
        // Objects appear whole, like a bucket PUT; one temp name per upload
        let tmp = path.with_extension(format!("json.{}.tmp", generate_id()));
        tokio::fs::write(&tmp, data)
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))
    }

    async fn download(&self, id: &str) -> RemoteResult<Vec<u8>> {
        let key = object_key(&self.prefix, id);
        tokio::fs::read(self.full_path(id)).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                RemoteError::NotFound(key)
            } else {
                RemoteError::Unavailable(e.to_string())
            }
        })
    }
}
