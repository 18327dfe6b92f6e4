use std::time::Duration;
use tracing::debug;

use super::error::{Result, ShareError};
use super::key::StorageKey;
use super::store::ObjectStore;

/// Longest lifetime a SigV4 pre-signed URL can have (7 days)
pub const MAX_URL_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// A pre-signed GET URL and how long it stays valid from issuance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedLink {
    pub url: String,
    pub expires_in: Duration,
}

/// Generate a pre-signed GET URL for `key`, valid for exactly `expires_in`
///
/// The key is not checked for existence: a missing object fails when the
/// link is fetched, not here.
pub async fn issue_presigned_get<S>(
    store: &S,
    key: &StorageKey,
    expires_in: Duration,
) -> Result<SignedLink>
where
    S: ObjectStore + ?Sized,
{
    if expires_in.is_zero() || expires_in > MAX_URL_EXPIRY {
        return Err(ShareError::sign(
            key.as_str(),
            format!(
                "expiry of {}s is outside 1..={}s",
                expires_in.as_secs(),
                MAX_URL_EXPIRY.as_secs()
            ),
        ));
    }

    let url = store.presign_get(key, expires_in).await?;
    debug!("Pre-signed {} for {}s", key, expires_in.as_secs());

    Ok(SignedLink { url, expires_in })
}
