use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tracing::{debug, warn};

use crate::config::Config;
use crate::s3::error::Result;
use crate::s3::{
    ObjectStore, ShareError, SignedLink, StorageKey, TagSet, derive_key, derive_tags,
    issue_presigned_get, upload,
};

/// A file the user asked to share
#[derive(Debug, Clone)]
pub struct UploadRequest {
    local_path: PathBuf,
    original_name: String,
}

impl UploadRequest {
    pub fn new(local_path: impl Into<PathBuf>) -> Result<Self> {
        let local_path = local_path.into();
        if local_path.as_os_str().is_empty() {
            return Err(ShareError::Argument("file path cannot be empty".to_string()));
        }

        let original_name = crate::s3::key::base_name(&local_path).ok_or_else(|| {
            ShareError::Argument(format!(
                "'{}' does not name a file",
                local_path.display()
            ))
        })?;

        Ok(Self {
            local_path,
            original_name,
        })
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }
}

/// Key and tags chosen for one upload
#[derive(Debug, Clone)]
pub struct SharePlan {
    pub key: StorageKey,
    pub tags: TagSet,
}

impl SharePlan {
    pub fn new(config: &Config, request: &UploadRequest) -> Self {
        Self {
            key: derive_key(&config.key_prefix, request.local_path()),
            tags: derive_tags(request.local_path()),
        }
    }
}

/// How far a share run got
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    FileOpened,
    Uploaded,
    LinkIssued,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::FileOpened => "file-opened",
            Stage::Uploaded => "uploaded",
            Stage::LinkIssued => "link-issued",
        };
        f.write_str(name)
    }
}

/// Upload the requested file and issue a download link for it
///
/// Stops at the first failure. An object that was stored before link
/// issuance failed stays in the bucket.
pub async fn share_file<S>(store: &S, config: &Config, request: &UploadRequest) -> Result<SignedLink>
where
    S: ObjectStore + ?Sized,
{
    let plan = SharePlan::new(config, request);
    let mut stage = Stage::Init;

    let result = drive(store, config, request, plan, &mut stage).await;
    if let Err(e) = &result {
        warn!("Share of {} stopped after stage {}: {}", request.local_path().display(), stage, e);
    }
    result
}

async fn drive<S>(
    store: &S,
    config: &Config,
    request: &UploadRequest,
    plan: SharePlan,
    stage: &mut Stage,
) -> Result<SignedLink>
where
    S: ObjectStore + ?Sized,
{
    let path = request.local_path();
    let file = File::open(path)
        .await
        .map_err(|e| ShareError::file_access(path, e))?;

    let metadata = file
        .metadata()
        .await
        .map_err(|e| ShareError::file_access(path, e))?;
    if !metadata.is_file() {
        return Err(ShareError::file_access(
            path,
            std::io::Error::other("not a regular file"),
        ));
    }
    advance(stage, Stage::FileOpened);

    let key = upload(store, file, plan.key, &plan.tags).await?;
    advance(stage, Stage::Uploaded);

    let link = issue_presigned_get(store, &key, config.url_expiry).await?;
    advance(stage, Stage::LinkIssued);

    Ok(link)
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!("{} -> {}", stage, next);
    *stage = next;
}

/// Share the file and write its link to `out` as a single line
pub async fn run<S, W>(
    store: &S,
    config: &Config,
    request: &UploadRequest,
    out: &mut W,
) -> Result<SignedLink>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    let link = share_file(store, config, request).await?;
    writeln!(out, "{}", link.url)?;
    Ok(link)
}
