//! # S3 Backing
//!
//! Enabled with the `s3` feature. Credentials and region come from the
//! standard AWS environment chain.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use super::backing::{object_key, Backing};
use super::errors::{RemoteError, RemoteResult};

/// Backing that stores records as objects in one S3 bucket
#[derive(Debug, Clone)]
pub struct S3Backing {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Backing {
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Build a client from the ambient AWS configuration
    pub async fn from_env(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), bucket, prefix)
    }
}

#[async_trait]
impl Backing for S3Backing {
    async fn upload(&self, id: &str, data: Vec<u8>) -> RemoteResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(object_key(&self.prefix, id))
            .content_type("application/json")
            .body(ByteStream::from(data))
            .send()
            .await
            .map(|_| ())
            .map_err(|e| RemoteError::Unavailable(e.into_service_error().to_string()))
    }

    async fn download(&self, id: &str) -> RemoteResult<Vec<u8>> {
        let key = object_key(&self.prefix, id);
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                let err = e.into_service_error();
                if err.is_no_such_key() {
                    return Err(RemoteError::NotFound(key));
                }
                return Err(RemoteError::Unavailable(err.to_string()));
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        Ok(body.into_bytes().to_vec())
    }
}
