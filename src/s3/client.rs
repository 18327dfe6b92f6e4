use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::time::Duration;

use super::error::{Result, ShareError};
use super::key::{StorageKey, TagSet};
use super::store::ObjectStore;
use crate::config::Config;

/// S3-backed object store
pub struct S3Client {
    client: Client,
    pub config: Config,
}

impl S3Client {
    pub async fn new(config: Config) -> Result<Self> {
        let mut aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let Some(profile) = &config.profile {
            aws_config = aws_config.profile_name(profile);
        }

        let sdk_config = aws_config.load().await;
        resolve_credentials(sdk_config.credentials_provider()).await?;

        Ok(Self::with_client(Client::new(&sdk_config), config))
    }

    pub fn with_client(client: Client, config: Config) -> Self {
        Self { client, config }
    }
}

/// Fail early when the provider chain yields no credentials
///
/// Otherwise a missing login only shows up once the put is rejected.
async fn resolve_credentials(provider: Option<SharedCredentialsProvider>) -> Result<()> {
    let provider = provider.ok_or_else(|| {
        ShareError::Config("no AWS credentials provider is configured".to_string())
    })?;

    provider.provide_credentials().await.map_err(|e| {
        ShareError::Config(format!(
            "AWS credentials could not be resolved: {}",
            DisplayErrorContext(&e)
        ))
    })?;

    Ok(())
}

#[async_trait]
impl ObjectStore for S3Client {
    fn bucket(&self) -> &str {
        &self.config.bucket
    }

    async fn put_object(&self, key: &StorageKey, body: ByteStream, tags: &TagSet) -> Result<()> {
        self.client
            .put_object()
            .bucket(self.bucket())
            .key(key.as_str())
            .body(body)
            .tagging(tags.to_string())
            .send()
            .await
            .map_err(|e| ShareError::upload(self.bucket(), key.as_str(), DisplayErrorContext(&e)))?;

        Ok(())
    }

    async fn presign_get(&self, key: &StorageKey, expires_in: Duration) -> Result<String> {
        let presigning_config =
            PresigningConfig::expires_in(expires_in).map_err(|e| ShareError::sign(key.as_str(), e))?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(self.bucket())
            .key(key.as_str())
            .presigned(presigning_config)
            .await
            .map_err(|e| ShareError::sign(key.as_str(), DisplayErrorContext(&e)))?;

        Ok(presigned_request.uri().to_string())
    }
}
