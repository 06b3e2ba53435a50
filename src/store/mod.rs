//! # Record Store
//!
//! Card records are flat JSON files. The local directory is the read path;
//! a remote object store (a directory laid out like a bucket, or S3 with
//! the `s3` feature) keeps a durable copy and refills the local directory
//! after a restart.

pub mod backing;
pub mod errors;
pub mod local;
pub mod record;
#[cfg(feature = "s3")]
pub mod s3;
pub mod tiered;

pub use backing::{object_key, Backing, DirectoryBacking, DEFAULT_PREFIX};
pub use errors::{RemoteError, RemoteResult, StoreError, StoreResult};
pub use local::LocalStore;
pub use record::{generate_id, is_valid_id, Record};
#[cfg(feature = "s3")]
pub use s3::S3Backing;
pub use tiered::{ReadRepair, TieredStore};
