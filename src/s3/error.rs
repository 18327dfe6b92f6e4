use std::path::Path;
use thiserror::Error;

/// Errors that can stop a share run
///
/// Every variant is terminal: the first one raised ends the run.
#[derive(Error, Debug)]
pub enum ShareError {
    /// Missing or unusable command-line input
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Local file cannot be opened or is not a regular file
    #[error("Cannot read file {path}: {source}")]
    FileAccess {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Region, bucket, prefix, expiry or credentials could not be resolved
    #[error("Configuration error: {0}")]
    Config(String),

    /// The store rejected or failed the put
    #[error("Upload of '{key}' to bucket '{bucket}' failed: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },

    /// Pre-signed URL could not be computed
    #[error("Cannot pre-sign '{key}': {message}")]
    Sign { key: String, message: String },

    /// Writing the result line failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShareError {
    pub fn file_access(path: &Path, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn upload<E: std::fmt::Display>(bucket: &str, key: &str, error: E) -> Self {
        Self::Upload {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: error.to_string(),
        }
    }

    pub fn sign<E: std::fmt::Display>(key: &str, error: E) -> Self {
        Self::Sign {
            key: key.to_string(),
            message: error.to_string(),
        }
    }

    fn is_access_denied(message: &str) -> bool {
        let message = message.to_lowercase();
        message.contains("access denied")
            || message.contains("accessdenied")
            || message.contains("forbidden")
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::FileAccess { path, source } => match source.kind() {
                std::io::ErrorKind::NotFound => format!(
                    "File not found: {}\n\nPossible solutions:\n  \
                     1. Pass the absolute path of the file to share\n  \
                     2. Look for it with: ls -la {}",
                    path, path
                ),
                std::io::ErrorKind::PermissionDenied => format!(
                    "Permission denied: {}\n\nPossible solutions:\n  \
                     1. Inspect the file mode and owner: ls -l {}\n  \
                     2. Run s3share as a user that can read it",
                    path, path
                ),
                _ => self.to_string(),
            },
            Self::Upload {
                bucket, message, ..
            } if Self::is_access_denied(message) => format!(
                "Bucket '{}' refused the upload: {}\n\nPossible solutions:\n  \
                 1. Confirm which identity is in use: aws sts get-caller-identity\n  \
                 2. Grant it s3:PutObject and s3:PutObjectTagging on the bucket\n  \
                 3. Point S3_BUCKET at a bucket you own: aws s3 ls s3://{}\n  \
                 4. If the policy only allows some keys, pass a matching --prefix or set S3_KEY_PREFIX\n  \
                 5. Make sure AWS_REGION is the bucket's region",
                bucket, message, bucket
            ),
            Self::Config(message) => format!(
                "Configuration error: {}\n\nPossible solutions:\n  \
                 1. Check AWS_REGION, S3_BUCKET, S3_KEY_PREFIX and S3_URL_EXPIRY_SECS in .env\n  \
                 2. Verify your AWS credentials or AWS_PROFILE",
                message
            ),
            _ => self.to_string(),
        }
    }
}

/// Result type for share operations
pub type Result<T> = std::result::Result<T, ShareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_access_hints_for_missing_file() {
        let err = ShareError::file_access(
            Path::new("/tmp/missing.pdf"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );

        let message = err.user_message();
        assert!(message.starts_with("File not found: /tmp/missing.pdf"));
        assert!(message.contains("ls -la /tmp/missing.pdf"));
    }

    #[test]
    fn test_upload_access_denied_hints() {
        let err = ShareError::upload("fbm-files", "files/x.pdf", "AccessDenied: Access Denied");
        let hints = err.user_message();
        assert!(hints.starts_with("Bucket 'fbm-files' refused the upload"));
        assert!(hints.contains("S3_BUCKET"));
        assert!(hints.contains("--prefix"));

        let err = ShareError::upload("fbm-files", "files/x.pdf", "dispatch failure");
        assert_eq!(
            err.user_message(),
            "Upload of 'files/x.pdf' to bucket 'fbm-files' failed: dispatch failure"
        );
    }
}
