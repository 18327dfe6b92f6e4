use aws_sdk_s3::primitives::ByteStream;
use tokio::fs::File;
use tracing::{debug, info};

use super::error::{Result, ShareError};
use super::key::{StorageKey, TagSet};
use super::store::ObjectStore;

/// Upload an opened file under `key` with `tags` attached
///
/// Returns `key` unchanged on success. There is no retry and a failed put is
/// not cleaned up.
pub async fn upload<S>(store: &S, file: File, key: StorageKey, tags: &TagSet) -> Result<StorageKey>
where
    S: ObjectStore + ?Sized,
{
    let file_size = file
        .metadata()
        .await
        .map_err(|e| ShareError::upload(store.bucket(), key.as_str(), e))?
        .len();

    // Content length comes from the file metadata
    let body = ByteStream::read_from()
        .file(file)
        .build()
        .await
        .map_err(|e| ShareError::upload(store.bucket(), key.as_str(), e))?;

    debug!("Uploading {} bytes to s3://{}/{}", file_size, store.bucket(), key);

    store.put_object(&key, body, tags).await?;

    info!("Uploaded s3://{}/{} ({} bytes)", store.bucket(), key, file_size);

    Ok(key)
}
