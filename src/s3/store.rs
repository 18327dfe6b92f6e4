use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use std::time::Duration;

use super::error::Result;
use super::key::{StorageKey, TagSet};

/// Object storage capabilities a share run needs
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket objects are written to
    fn bucket(&self) -> &str;

    /// Store `body` under `key` with `tags` attached
    async fn put_object(&self, key: &StorageKey, body: ByteStream, tags: &TagSet) -> Result<()>;

    /// Pre-sign a GET of `key` valid for `expires_in`
    async fn presign_get(&self, key: &StorageKey, expires_in: Duration) -> Result<String>;
}
